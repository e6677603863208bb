pub use super::attendance::Entity as Attendance;
pub use super::contractors::Entity as Contractors;
pub use super::employees::Entity as Employees;
pub use super::payments::Entity as Payments;
pub use super::projects::Entity as Projects;
pub use super::sites::Entity as Sites;
pub use super::suppliers::Entity as Suppliers;
pub use super::users::Entity as Users;
