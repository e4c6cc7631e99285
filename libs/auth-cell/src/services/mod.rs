pub mod password;
pub mod user;

pub use password::PasswordService;
pub use user::UserDirectoryService;
