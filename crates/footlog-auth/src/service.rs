use super::*;
use footlog_core::ID;
use footlog_core::Unique;

/// Entry point for every authentication flow: sign-up, password login,
/// delegated login, reissue and logout. Owns the session lifecycle; holds no
/// mutable state of its own.
pub struct Authenticator<M, S> {
    config: Config,
    crypto: Crypto,
    accounts: Resolver<M>,
    sessions: S,
    kakao: Kakao,
}

impl<M, S> Authenticator<M, S>
where
    M: MemberRepository,
    S: SessionStore,
{
    pub fn new(config: Config, members: M, sessions: S) -> Result<Self, AuthError> {
        Ok(Self {
            crypto: Crypto::new(&config),
            accounts: Resolver::new(members),
            kakao: Kakao::new(config.provider.clone())?,
            sessions,
            config,
        })
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn crypto(&self) -> &Crypto {
        &self.crypto
    }
    pub fn accounts(&self) -> &Resolver<M> {
        &self.accounts
    }
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<Member, AuthError> {
        if req.password != req.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        let member = Member::new(ID::default(), req.name.clone(), req.email.clone())
            .with_hashword(password::hash(&req.password)?)
            .with_gender(req.gender.as_deref().map(Gender::from).unwrap_or_default())
            .with_origin(Origin::Local)
            .with_role(Role::User);
        self.accounts.register(member).await
    }

    pub async fn login(&self, email: &str, secret: &str, ip: &str) -> Result<TokenPair, AuthError> {
        let member = self
            .accounts
            .by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredential)?;
        password::check(secret, member.hashword().ok_or(AuthError::InvalidCredential)?)?;
        log::info!("member {} logged in from {}", member.id(), ip);
        self.open(&member, ip).await
    }

    /// Delegated login: authorization code in, fresh session out.
    pub async fn kakao(&self, code: &str, ip: &str) -> Result<TokenPair, AuthError> {
        let member = self.kakao.login(code, &self.accounts).await?;
        log::info!("member {} logged in through kakao from {}", member.id(), ip);
        self.open(&member, ip).await
    }

    /// Rotates a refresh token. The presented token must be the one currently
    /// stored for its account and must come from the address that obtained it.
    pub async fn reissue(&self, token: &str, ip: &str) -> Result<TokenPair, AuthError> {
        let claims = self.crypto.verify(token)?;
        if claims.kind() != Kind::Refresh {
            return Err(AuthError::NotARefreshToken);
        }
        let account = self
            .sessions
            .owner(token)
            .await?
            .filter(|account| *account == claims.user())
            .ok_or(AuthError::RefreshTokenNotFound)?;
        match self.sessions.get_ip(account).await? {
            Some(ref stored) if stored == ip => {}
            Some(ref stored) => {
                log::warn!(
                    "refresh for {} from {} but session belongs to {}",
                    account,
                    ip,
                    stored
                );
                return Err(AuthError::IpMismatch);
            }
            None => return Err(AuthError::RefreshTokenNotFound),
        }
        let member = self.accounts.by_id(account).await?;
        log::debug!("rotating refresh token for {}", account);
        self.open(&member, ip).await
    }

    /// Ends the session of whoever holds a valid access token.
    pub async fn logout(&self, token: Option<&str>) -> Result<ID<Member>, AuthError> {
        let claims = self.authenticate(token.ok_or(AuthError::MissingToken)?)?;
        self.sessions.delete(claims.user()).await?;
        log::info!("member {} logged out", claims.user());
        Ok(claims.user())
    }

    /// Verifies an access token for an authenticated request.
    pub fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.crypto.verify(token)?;
        match claims.kind() {
            Kind::Access => Ok(claims),
            Kind::Refresh => Err(AuthError::NotAnAccessToken),
        }
    }

    /// Issues a pair and makes its refresh token the account's only session.
    async fn open(&self, member: &Member, ip: &str) -> Result<TokenPair, AuthError> {
        let pair = self.crypto.pair(member)?;
        let ref session = Session::new(pair.refresh.clone(), ip.to_owned(), pair.refresh_ttl);
        self.sessions.put(member.id(), session).await?;
        Ok(pair)
    }
}
