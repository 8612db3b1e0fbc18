use chrono::Duration;
use rand::Rng;

use crate::config::Config;

/// How one-time codes are minted: length in digits and lifetime.
#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    pub ttl: Duration,
    pub length: usize,
}

impl OtpPolicy {
    pub fn new(ttl: Duration, length: usize) -> Self {
        Self { ttl, length }
    }

    pub fn from_config(config: &Config) -> Self {
        let ttl = Duration::from_std(config.otp_ttl).unwrap_or_else(|_| Duration::minutes(10));
        Self::new(ttl, config.otp_length)
    }

    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect()
    }
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self::new(Duration::minutes(10), 6)
    }
}
