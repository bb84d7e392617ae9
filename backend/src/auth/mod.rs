//! Credential handling
//!
//! Provides argon2 password hashing for registration and login.

mod password;

pub use password::PasswordService;
