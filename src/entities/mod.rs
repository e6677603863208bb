pub mod prelude;

pub mod attendance;
pub mod contractors;
pub mod employees;
pub mod payments;
pub mod projects;
pub mod sites;
pub mod suppliers;
pub mod users;
