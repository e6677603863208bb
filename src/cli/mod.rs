//! CLI module - Command-line interface for GofarTrack
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// GofarTrack - construction site workforce backend
#[derive(Parser)]
#[command(name = "gofartrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create a user account directly against the configured database
    CreateUser {
        /// Display name
        #[arg(long)]
        name: String,
        /// Login phone number
        #[arg(long)]
        phone: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Password (at least 6 characters)
        #[arg(long)]
        password: String,
        /// Role: admin or user
        #[arg(long, default_value = "admin")]
        role: String,
    },

    /// List user accounts
    #[command(alias = "ls")]
    Users,
}

pub use commands::*;
