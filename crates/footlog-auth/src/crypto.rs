use super::*;
use footlog_core::ID;
use footlog_core::Unique;
use std::time::Duration;

/// Cookie (and carrier lookup name) for access tokens.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie (and carrier lookup name) for refresh tokens.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Stateless HS256 signer and verifier for access and refresh tokens.
#[derive(Clone)]
pub struct Crypto {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    validation: jsonwebtoken::Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Crypto {
    pub fn new(config: &Config) -> Self {
        // expiry is checked by hand so the boundary instant is already invalid
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: jsonwebtoken::DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }
    pub fn ttl(&self, kind: Kind) -> Duration {
        match kind {
            Kind::Access => self.access_ttl,
            Kind::Refresh => self.refresh_ttl,
        }
    }
    pub fn issue(
        &self,
        user: ID<Member>,
        name: &str,
        roles: &[Role],
        kind: Kind,
    ) -> Result<(String, Duration), AuthError> {
        self.issue_at(user, name, roles, kind, now())
    }
    pub fn issue_at(
        &self,
        user: ID<Member>,
        name: &str,
        roles: &[Role],
        kind: Kind,
        now: i64,
    ) -> Result<(String, Duration), AuthError> {
        let ttl = self.ttl(kind);
        let claims = Claims::new(
            user,
            name.to_owned(),
            roles.to_vec(),
            kind,
            now,
            now + ttl.as_secs() as i64,
        );
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.encoding)
            .map(|token| (token, ttl))
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
    /// Issues both halves of a session for `member`.
    pub fn pair(&self, member: &Member) -> Result<TokenPair, AuthError> {
        let ref roles = [member.role()];
        let (access, access_ttl) = self.issue(member.id(), member.name(), roles, Kind::Access)?;
        let (refresh, refresh_ttl) = self.issue(member.id(), member.name(), roles, Kind::Refresh)?;
        Ok(TokenPair {
            access,
            access_ttl,
            refresh,
            refresh_ttl,
            user: member.id(),
        })
    }
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, now())
    }
    /// Signature first, then expiry, then claim structure.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<serde_json::Value>(token, &self.decoding, &self.validation)
            .map_err(Self::classify)?;
        let exp = data
            .claims
            .get("exp")
            .and_then(serde_json::Value::as_i64)
            .ok_or(AuthError::Malformed)?;
        if now >= exp {
            return Err(AuthError::Expired);
        }
        serde_json::from_value::<Claims>(data.claims).map_err(|_| AuthError::Malformed)
    }
    pub fn kind(&self, token: &str) -> Result<Kind, AuthError> {
        self.verify(token).map(|claims| claims.kind())
    }
    /// Locates a named token on the carrier without evaluating it. Access
    /// tokens may also arrive as an `Authorization: Bearer` header.
    pub fn extract<C: Carrier + ?Sized>(carrier: &C, name: &str) -> Option<String> {
        carrier
            .cookie(name)
            .filter(|s| !s.is_empty())
            .or_else(|| match name {
                ACCESS_COOKIE => carrier
                    .header("Authorization")
                    .and_then(|h| h.strip_prefix("Bearer ").map(|s| s.trim().to_owned()))
                    .filter(|s| !s.is_empty()),
                _ => None,
            })
    }
    pub fn hash(token: &str) -> Vec<u8> {
        use sha2::Digest;
        sha2::Sha256::digest(token.as_bytes()).to_vec()
    }
    fn classify(e: jsonwebtoken::errors::Error) -> AuthError {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Malformed,
        }
    }
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const T0: i64 = 1_700_000_000;

    fn crypto(secret: &str) -> Crypto {
        Crypto::new(&Config::new(secret))
    }

    #[test]
    fn access_token_round_trips() {
        let crypto = crypto("secret");
        let user = ID::default();
        let (token, ttl) = crypto
            .issue(user, "Kim", &[Role::Admin], Kind::Access)
            .unwrap();
        let claims = crypto.verify(&token).unwrap();
        assert_eq!(claims.user(), user);
        assert_eq!(claims.name(), "Kim");
        assert_eq!(claims.roles(), &[Role::Admin]);
        assert_eq!(claims.kind(), Kind::Access);
        assert_eq!(crypto.kind(&token).unwrap(), Kind::Access);
        assert_eq!(ttl, Config::new("secret").access_ttl);
        assert_eq!(claims.exp - claims.iat, ttl.as_secs() as i64);
    }

    #[test]
    fn refresh_and_access_use_distinct_validity() {
        let crypto = crypto("secret");
        let user = ID::default();
        let (access, _) = crypto.issue(user, "Kim", &[Role::User], Kind::Access).unwrap();
        let (refresh, _) = crypto.issue(user, "Kim", &[Role::User], Kind::Refresh).unwrap();
        let access = crypto.verify(&access).unwrap();
        let refresh = crypto.verify(&refresh).unwrap();
        assert_eq!(refresh.kind(), Kind::Refresh);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn tokens_issued_together_differ() {
        let crypto = crypto("secret");
        let user = ID::default();
        let (a, _) = crypto.issue_at(user, "Kim", &[], Kind::Refresh, T0).unwrap();
        let (b, _) = crypto.issue_at(user, "Kim", &[], Kind::Refresh, T0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let crypto = crypto("secret");
        let (token, ttl) = crypto
            .issue_at(ID::default(), "Kim", &[Role::User], Kind::Access, T0)
            .unwrap();
        let exp = T0 + ttl.as_secs() as i64;
        let claims = crypto.verify_at(&token, exp - 1).unwrap();
        assert!(!claims.expired_at(exp - 1));
        assert!(claims.expired_at(exp));
        assert_eq!(crypto.verify_at(&token, exp), Err(AuthError::Expired));
        assert_eq!(crypto.verify_at(&token, exp + 1), Err(AuthError::Expired));
    }

    #[test]
    fn foreign_secret_is_invalid_signature() {
        let ours = crypto("secret");
        let theirs = crypto("another secret");
        let (token, _) = theirs
            .issue(ID::default(), "Kim", &[Role::User], Kind::Access)
            .unwrap();
        assert_eq!(ours.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_is_invalid_signature() {
        let crypto = crypto("secret");
        let (token, _) = crypto
            .issue(ID::default(), "Kim", &[Role::User], Kind::Access)
            .unwrap();
        let (victim, _) = crypto
            .issue(ID::default(), "Lee", &[Role::Admin], Kind::Access)
            .unwrap();
        let parts = token.split('.').collect::<Vec<_>>();
        let other = victim.split('.').collect::<Vec<_>>();
        let forged = format!("{}.{}.{}", parts[0], other[1], parts[2]);
        assert_eq!(crypto.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let crypto = crypto("secret");
        assert_eq!(crypto.verify("not a token"), Err(AuthError::Malformed));
        assert_eq!(crypto.verify("a.b.c"), Err(AuthError::Malformed));
    }

    #[test]
    fn signed_but_incomplete_claims_are_malformed() {
        let crypto = crypto("secret");
        let key = jsonwebtoken::EncodingKey::from_secret(b"secret");
        let header = jsonwebtoken::Header::default();
        let partial = serde_json::json!({ "sub": "someone", "exp": T0 + 60 });
        let token = jsonwebtoken::encode(&header, &partial, &key).unwrap();
        assert_eq!(crypto.verify_at(&token, T0), Err(AuthError::Malformed));
        let stale = serde_json::json!({ "sub": "someone", "exp": T0 - 60 });
        let token = jsonwebtoken::encode(&header, &stale, &key).unwrap();
        assert_eq!(crypto.verify_at(&token, T0), Err(AuthError::Expired));
        let timeless = serde_json::json!({ "sub": "someone" });
        let token = jsonwebtoken::encode(&header, &timeless, &key).unwrap();
        assert_eq!(crypto.verify_at(&token, T0), Err(AuthError::Malformed));
    }

    struct Parcel {
        cookies: HashMap<String, String>,
        headers: HashMap<String, String>,
    }

    impl Carrier for Parcel {
        fn peer(&self) -> Option<std::net::IpAddr> {
            None
        }
        fn cookie(&self, name: &str) -> Option<String> {
            self.cookies.get(name).cloned()
        }
        fn header(&self, name: &str) -> Option<String> {
            self.headers.get(name).cloned()
        }
    }

    #[test]
    fn extract_prefers_cookie_then_bearer() {
        let ref mut parcel = Parcel {
            cookies: HashMap::new(),
            headers: HashMap::from([("Authorization".to_owned(), "Bearer abc".to_owned())]),
        };
        assert_eq!(Crypto::extract(parcel, ACCESS_COOKIE).as_deref(), Some("abc"));
        assert_eq!(Crypto::extract(parcel, REFRESH_COOKIE), None);
        parcel.cookies.insert(ACCESS_COOKIE.to_owned(), "xyz".to_owned());
        parcel.cookies.insert(REFRESH_COOKIE.to_owned(), "r".to_owned());
        assert_eq!(Crypto::extract(parcel, ACCESS_COOKIE).as_deref(), Some("xyz"));
        assert_eq!(Crypto::extract(parcel, REFRESH_COOKIE).as_deref(), Some("r"));
    }
}
