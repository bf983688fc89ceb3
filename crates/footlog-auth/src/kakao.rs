use super::*;
use serde::Deserialize;

/// Token endpoint response. Only the access token matters here.
#[derive(Debug, Deserialize)]
struct KakaoToken {
    access_token: String,
}

/// Userinfo endpoint response.
#[derive(Debug, Deserialize)]
struct KakaoUser {
    #[serde(default)]
    properties: Option<KakaoProperties>,
    #[serde(default)]
    kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Deserialize)]
struct KakaoProperties {
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    nickname: Option<String>,
    gender: Option<String>,
}

/// Delegated login through Kakao OAuth: authorization code in, local
/// profile out. Every step is terminal on failure; nothing is retried since
/// authorization codes are single-use.
pub struct Kakao {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl Kakao {
    pub fn new(config: ProviderConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::ProviderExchangeFailed(e.to_string()))?;
        Ok(Self { config, http })
    }
    /// Exchanges an authorization code for a provider access token.
    pub async fn exchange(&self, code: &str) -> Result<String, AuthError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];
        if let Some(ref secret) = self.config.client_secret {
            form.push(("client_secret", secret.as_str()));
        }
        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::ProviderExchangeFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("kakao token exchange rejected with {}", status);
            return Err(AuthError::ProviderExchangeFailed(status.to_string()));
        }
        response
            .json::<KakaoToken>()
            .await
            .map(|token| token.access_token)
            .map_err(|e| AuthError::ProviderExchangeFailed(e.to_string()))
    }
    /// Fetches the remote profile with the provider access token.
    pub async fn profile(&self, access: &str) -> Result<Profile, AuthError> {
        let response = self
            .http
            .get(&self.config.userinfo_uri)
            .bearer_auth(access)
            .send()
            .await
            .map_err(|e| AuthError::ProviderProfileFetchFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("kakao profile fetch rejected with {}", status);
            return Err(AuthError::ProviderProfileFetchFailed(status.to_string()));
        }
        let user = response
            .json::<KakaoUser>()
            .await
            .map_err(|e| AuthError::ProviderProfileFetchFailed(e.to_string()))?;
        user.into_profile()
    }
    /// Code in, resolved local account out.
    pub async fn login<M>(&self, code: &str, accounts: &Resolver<M>) -> Result<Member, AuthError>
    where
        M: MemberRepository,
    {
        let access = self.exchange(code).await?;
        let profile = self.profile(&access).await?;
        accounts.find_or_create(&profile).await
    }
}

impl KakaoUser {
    fn into_profile(self) -> Result<Profile, AuthError> {
        let account = self.kakao_account.ok_or_else(|| {
            AuthError::ProviderProfileFetchFailed(String::from("profile has no kakao_account"))
        })?;
        let email = account
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AuthError::ProviderProfileFetchFailed(String::from("profile has no email")))?;
        let name = self
            .properties
            .and_then(|p| p.nickname)
            .or(account.nickname)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_owned());
        Ok(Profile {
            gender: account.gender.as_deref().map(Gender::from).unwrap_or_default(),
            origin: Origin::Kakao,
            email,
            name,
        })
    }
}
