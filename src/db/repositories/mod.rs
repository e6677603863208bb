pub mod attendance;
pub mod contractor;
pub mod employee;
pub mod payment;
pub mod project;
pub mod site;
pub mod supplier;
pub mod user;
