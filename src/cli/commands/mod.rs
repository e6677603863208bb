mod create_user;
mod users;

pub use create_user::cmd_create_user;
pub use users::cmd_list_users;
