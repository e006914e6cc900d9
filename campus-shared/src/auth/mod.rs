//! Session tokens and admin password hashing.

mod password;
mod tokens;

pub use password::*;
pub use tokens::*;
