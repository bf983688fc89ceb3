use super::*;
use footlog_core::ID;
use std::time::Duration;

/// Freshly issued access and refresh tokens for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub access_ttl: Duration,
    pub refresh: String,
    pub refresh_ttl: Duration,
    pub user: ID<Member>,
}

impl TokenPair {
    /// Response body for the caller. It has no refresh token field; that
    /// token travels only in its HttpOnly cookie.
    pub fn body(&self) -> TokenBody {
        TokenBody {
            grant_type: String::from(GRANT_TYPE),
            access_token: self.access.clone(),
            access_token_valid_time: self.access_ttl.as_millis() as u64,
            refresh_token_valid_time: self.refresh_ttl.as_millis() as u64,
            user_id: self.user.inner(),
        }
    }
}
