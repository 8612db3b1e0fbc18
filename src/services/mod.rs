pub mod extract;
pub mod hashing;
pub mod jwt;
pub mod mailer;
pub mod otp;
pub mod rate_limit;
pub mod security;
pub mod server;
