//! Mobile-side client for the campus API.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{ApiClient, OtpLogin};
pub use error::{ClientError, ClientResult};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};
