/// Failures surfaced by the authentication core.
///
/// Every variant except the infrastructure ones ([`AuthError::StoreUnavailable`],
/// [`AuthError::Hashing`], [`AuthError::Signing`], [`AuthError::Misconfigured`])
/// means the caller must authenticate again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredential,
    InvalidSignature,
    Expired,
    Malformed,
    MissingToken,
    NotARefreshToken,
    NotAnAccessToken,
    RefreshTokenNotFound,
    IpMismatch,
    AccountNotFound,
    EmailTaken,
    PasswordMismatch,
    ProviderExchangeFailed(String),
    ProviderProfileFetchFailed(String),
    StoreUnavailable(String),
    Hashing(String),
    Signing(String),
    Misconfigured(String),
}

impl AuthError {
    /// Stable tag for the caller-facing error body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Expired => "EXPIRED",
            Self::Malformed => "MALFORMED",
            Self::MissingToken => "MISSING_TOKEN",
            Self::NotARefreshToken => "NOT_A_REFRESH_TOKEN",
            Self::NotAnAccessToken => "NOT_AN_ACCESS_TOKEN",
            Self::RefreshTokenNotFound => "REFRESH_TOKEN_NOT_FOUND",
            Self::IpMismatch => "IP_MISMATCH",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::ProviderExchangeFailed(_) => "PROVIDER_EXCHANGE_FAILED",
            Self::ProviderProfileFetchFailed(_) => "PROVIDER_PROFILE_FETCH_FAILED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Hashing(_) => "HASHING_FAILED",
            Self::Signing(_) => "SIGNING_FAILED",
            Self::Misconfigured(_) => "MISCONFIGURED",
        }
    }
    /// Server-side conditions a client may retry. Everything else
    /// requires a fresh login.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::Hashing(_) | Self::Signing(_)
        )
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredential => write!(f, "invalid credentials"),
            Self::InvalidSignature => write!(f, "invalid token signature"),
            Self::Expired => write!(f, "token expired"),
            Self::Malformed => write!(f, "malformed token"),
            Self::MissingToken => write!(f, "missing token"),
            Self::NotARefreshToken => write!(f, "not a refresh token"),
            Self::NotAnAccessToken => write!(f, "not an access token"),
            Self::RefreshTokenNotFound => write!(f, "refresh token not found"),
            Self::IpMismatch => write!(f, "client address differs from login address"),
            Self::AccountNotFound => write!(f, "account not found"),
            Self::EmailTaken => write!(f, "email already registered"),
            Self::PasswordMismatch => write!(f, "password confirmation does not match"),
            Self::ProviderExchangeFailed(s) => write!(f, "provider token exchange failed: {}", s),
            Self::ProviderProfileFetchFailed(s) => write!(f, "provider profile fetch failed: {}", s),
            Self::StoreUnavailable(s) => write!(f, "store unavailable: {}", s),
            Self::Hashing(s) => write!(f, "password hashing failed: {}", s),
            Self::Signing(s) => write!(f, "token signing failed: {}", s),
            Self::Misconfigured(s) => write!(f, "server misconfigured: {}", s),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(feature = "server")]
mod response {
    use super::*;
    use actix_web::HttpResponse;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    impl ResponseError for AuthError {
        fn status_code(&self) -> StatusCode {
            match self {
                Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                Self::Hashing(_) | Self::Signing(_) | Self::Misconfigured(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                Self::EmailTaken => StatusCode::CONFLICT,
                Self::PasswordMismatch => StatusCode::BAD_REQUEST,
                _ => StatusCode::UNAUTHORIZED,
            }
        }
        fn error_response(&self) -> HttpResponse {
            HttpResponse::build(self.status_code()).json(serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
            }))
        }
    }
}
