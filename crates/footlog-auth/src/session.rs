use super::*;
use footlog_core::ID;
use std::time::Duration;
use std::time::SystemTime;

/// The one live refresh session an account may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    ip: String,
    expires: SystemTime,
}

impl Session {
    pub fn new(token: String, ip: String, ttl: Duration) -> Self {
        Self {
            token,
            ip,
            expires: SystemTime::now() + ttl,
        }
    }
    pub fn token(&self) -> &str {
        &self.token
    }
    pub fn ip(&self) -> &str {
        &self.ip
    }
    pub fn expires_at(&self) -> SystemTime {
        self.expires
    }
    /// Remaining lifetime, zero once expired.
    pub fn ttl(&self) -> Duration {
        self.expires
            .duration_since(SystemTime::now())
            .unwrap_or_default()
    }
    pub fn expired(&self) -> bool {
        self.ttl().is_zero()
    }
    pub(crate) fn rebind(&mut self, ip: &str) {
        self.ip = ip.to_owned();
    }
}

/// Per-account refresh session storage with expiry.
///
/// Backend I/O failures are [`AuthError::StoreUnavailable`]; absence is
/// `Ok(None)`. Implementations must make `put` appear atomic: a reader never
/// sees a token without its IP, and the previous token stops resolving.
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    async fn put(&self, account: ID<Member>, session: &Session) -> Result<(), AuthError>;
    async fn get(&self, account: ID<Member>) -> Result<Option<String>, AuthError>;
    async fn put_ip(&self, account: ID<Member>, ip: &str) -> Result<(), AuthError>;
    async fn get_ip(&self, account: ID<Member>) -> Result<Option<String>, AuthError>;
    async fn delete(&self, account: ID<Member>) -> Result<(), AuthError>;
    /// Reverse lookup from a presented refresh token to its account.
    async fn owner(&self, token: &str) -> Result<Option<ID<Member>>, AuthError>;
}

/// Backend that is always down, for exercising outage paths.
#[cfg(test)]
pub(crate) struct Outage;
