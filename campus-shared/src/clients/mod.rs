pub mod db;
pub mod otp;
pub mod push;
