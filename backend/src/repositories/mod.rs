pub mod password_resets;
pub mod users;
