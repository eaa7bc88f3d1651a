pub mod cookies;
pub mod email;
pub mod jwt;
pub mod password;
pub mod security;
