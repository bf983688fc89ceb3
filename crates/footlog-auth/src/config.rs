use std::net::IpAddr;
use std::time::Duration;

const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);
const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);
const KAKAO_TOKEN_URI: &str = "https://kauth.kakao.com/oauth/token";
const KAKAO_USERINFO_URI: &str = "https://kapi.kakao.com/v2/user/me";

/// Signing and cookie settings shared by every authentication flow.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Where the delegated login redirects the browser once cookies are set.
    pub client_origin: String,
    pub secure_cookies: bool,
    /// Reverse proxies whose forwarding headers are believed.
    pub trusted_proxies: Vec<IpAddr>,
    pub provider: ProviderConfig,
}

/// OAuth client registration for the delegated login provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub token_uri: String,
    pub userinfo_uri: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: ACCESS_TOKEN_TTL,
            refresh_ttl: REFRESH_TOKEN_TTL,
            client_origin: String::from("http://localhost:3000"),
            secure_cookies: false,
            trusted_proxies: Vec::new(),
            provider: ProviderConfig::default(),
        }
    }
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        let defaults = ProviderConfig::default();
        Ok(Self {
            secret,
            access_ttl: seconds("ACCESS_TOKEN_TTL_SECS")?.unwrap_or(ACCESS_TOKEN_TTL),
            refresh_ttl: seconds("REFRESH_TOKEN_TTL_SECS")?.unwrap_or(REFRESH_TOKEN_TTL),
            client_origin: var("CLIENT_ORIGIN").unwrap_or_else(|| Self::new("").client_origin),
            secure_cookies: var("COOKIE_SECURE").is_some_and(|s| s == "true" || s == "1"),
            trusted_proxies: var("TRUSTED_PROXIES")
                .map(|s| proxies(&s))
                .transpose()?
                .unwrap_or_default(),
            provider: ProviderConfig {
                client_id: var("KAKAO_CLIENT_ID").unwrap_or_default(),
                client_secret: var("KAKAO_CLIENT_SECRET"),
                redirect_uri: var("KAKAO_REDIRECT_URI").unwrap_or_default(),
                token_uri: var("KAKAO_TOKEN_URI").unwrap_or(defaults.token_uri),
                userinfo_uri: var("KAKAO_USERINFO_URI").unwrap_or(defaults.userinfo_uri),
                timeout: seconds("PROVIDER_TIMEOUT_SECS")?.unwrap_or(PROVIDER_TIMEOUT),
            },
        })
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            client_id: String::default(),
            client_secret: None,
            redirect_uri: String::default(),
            token_uri: String::from(KAKAO_TOKEN_URI),
            userinfo_uri: String::from(KAKAO_USERINFO_URI),
            timeout: PROVIDER_TIMEOUT,
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn seconds(name: &str) -> anyhow::Result<Option<Duration>> {
    var(name)
        .map(|s| {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| anyhow::anyhow!("{} must be whole seconds: {}", name, e))
        })
        .transpose()
}

fn proxies(list: &str) -> anyhow::Result<Vec<IpAddr>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>()
                .map_err(|e| anyhow::anyhow!("TRUSTED_PROXIES entry {}: {}", s, e))
        })
        .collect()
}
