use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::cookie::Cookie;
use actix_web::cookie::SameSite;
use actix_web::http::header;
use actix_web::web;
use footlog_core::Unique;
use std::time::Duration;

type Service<M, S> = web::Data<Authenticator<M, S>>;

/// Mounts the `/api/auth` scope for a given member repository and session store.
pub fn routes<M, S>(cfg: &mut web::ServiceConfig)
where
    M: MemberRepository + 'static,
    S: SessionStore + 'static,
{
    cfg.service(
        web::scope("/api/auth")
            .route("/signup", web::post().to(signup::<M, S>))
            .route("/login", web::post().to(login::<M, S>))
            .route("/reissue", web::post().to(reissue::<M, S>))
            .route("/logout", web::post().to(logout::<M, S>))
            .route("/me", web::get().to(me))
            .route("/kakao/login", web::get().to(kakao::<M, S>)),
    );
}

pub async fn signup<M, S>(
    auth: Service<M, S>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AuthError>
where
    M: MemberRepository + 'static,
    S: SessionStore + 'static,
{
    let member = auth.register(&req).await?;
    Ok(HttpResponse::Created().json(UserInfo {
        id: member.id().to_string(),
        name: member.name().to_string(),
        roles: vec![member.role()],
    }))
}

pub async fn login<M, S>(
    auth: Service<M, S>,
    http: HttpRequest,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError>
where
    M: MemberRepository + 'static,
    S: SessionStore + 'static,
{
    let ref ip = address(&http, auth.config());
    let pair = auth.login(&req.email, &req.password, ip).await?;
    let secure = auth.config().secure_cookies;
    Ok(HttpResponse::Ok()
        .cookie(cookie(REFRESH_COOKIE, &pair.refresh, pair.refresh_ttl, secure))
        .json(pair.body()))
}

pub async fn reissue<M, S>(auth: Service<M, S>, http: HttpRequest) -> Result<HttpResponse, AuthError>
where
    M: MemberRepository + 'static,
    S: SessionStore + 'static,
{
    let token = Crypto::extract(&http, REFRESH_COOKIE).ok_or(AuthError::MissingToken)?;
    let ref ip = address(&http, auth.config());
    let pair = auth.reissue(&token, ip).await?;
    let secure = auth.config().secure_cookies;
    Ok(HttpResponse::Ok()
        .cookie(cookie(REFRESH_COOKIE, &pair.refresh, pair.refresh_ttl, secure))
        .json(pair.body()))
}

pub async fn logout<M, S>(auth: Service<M, S>, http: HttpRequest) -> Result<HttpResponse, AuthError>
where
    M: MemberRepository + 'static,
    S: SessionStore + 'static,
{
    let token = Crypto::extract(&http, ACCESS_COOKIE);
    auth.logout(token.as_deref()).await?;
    let secure = auth.config().secure_cookies;
    let mut refresh = cookie(REFRESH_COOKIE, "", Duration::ZERO, secure);
    refresh.make_removal();
    Ok(HttpResponse::Ok()
        .cookie(refresh)
        .json(serde_json::json!({"status": "logged_out"})))
}

pub async fn me(auth: Auth) -> impl Responder {
    HttpResponse::Ok().json(UserInfo {
        id: auth.user().to_string(),
        name: auth.claims().name().to_string(),
        roles: auth.claims().roles().to_vec(),
    })
}

/// Provider redirect target. Completes delegated login and bounces the
/// browser back to the client with both tokens set as cookies.
pub async fn kakao<M, S>(
    auth: Service<M, S>,
    http: HttpRequest,
    query: web::Query<CodeQuery>,
) -> Result<HttpResponse, AuthError>
where
    M: MemberRepository + 'static,
    S: SessionStore + 'static,
{
    let ref ip = address(&http, auth.config());
    let pair = auth.kakao(&query.code, ip).await?;
    let secure = auth.config().secure_cookies;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, auth.config().client_origin.clone()))
        .cookie(cookie(ACCESS_COOKIE, &pair.access, pair.access_ttl, secure))
        .cookie(cookie(REFRESH_COOKIE, &pair.refresh, pair.refresh_ttl, secure))
        .finish())
}

fn address(http: &HttpRequest, config: &Config) -> String {
    Carrier::ip(http, &config.trusted_proxies)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| String::from("unknown"))
}

fn cookie(name: &str, value: &str, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_owned(), value.to_owned())
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(actix_web::cookie::time::Duration::seconds(ttl.as_secs() as i64))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::App;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::method;
    use wiremock::matchers::path;

    const CLIENT: &str = "198.51.100.4:5000";
    const STRANGER: &str = "203.0.113.66:6000";
    const PROXY: &str = "10.0.0.2:443";

    fn peer(addr: &str) -> std::net::SocketAddr {
        addr.parse().unwrap()
    }

    fn config() -> Config {
        Config::new(String::from("handler-secret"))
    }

    async fn service(
        config: Config,
    ) -> (
        web::Data<Authenticator<Roster, Vault>>,
        web::Data<Crypto>,
    ) {
        let auth = Authenticator::new(config, Roster::default(), Vault::default()).expect("authenticator");
        let crypto = web::Data::new(auth.crypto().clone());
        (web::Data::new(auth), crypto)
    }

    macro_rules! app {
        ($config:expr) => {{
            let (auth, crypto) = service($config).await;
            test::init_service(
                App::new()
                    .app_data(auth)
                    .app_data(crypto)
                    .configure(routes::<Roster, Vault>),
            )
            .await
        }};
    }

    fn signup_body() -> Value {
        serde_json::json!({
            "name": "Lee",
            "email": "lee@example.com",
            "password": "correct horse",
            "confirmPassword": "correct horse",
        })
    }

    fn login_body() -> Value {
        serde_json::json!({"email": "lee@example.com", "password": "correct horse"})
    }

    fn refresh_of(resp: &actix_web::dev::ServiceResponse) -> Option<String> {
        resp.response()
            .cookies()
            .find(|c| c.name() == REFRESH_COOKIE)
            .map(|c| c.value().to_string())
    }

    #[actix_web::test]
    async fn signup_login_me_flow() {
        let app = app!(config());
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr(peer(CLIENT))
            .set_json(login_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let refresh = resp
            .response()
            .cookies()
            .find(|c| c.name() == REFRESH_COOKIE)
            .map(|c| c.into_owned())
            .expect("refresh cookie");
        assert_eq!(refresh.http_only(), Some(true));
        assert_eq!(refresh.same_site(), Some(SameSite::Lax));
        assert_eq!(refresh.path(), Some("/"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["grantType"], "Bearer");
        assert_eq!(body["accessTokenValidTime"], 900_000);
        assert_eq!(body["refreshTokenValidTime"], 604_800_000);
        assert!(body.get("refreshToken").is_none());
        let access = body["accessToken"].as_str().expect("access token").to_string();

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "Lee");
        assert_eq!(body["roles"][0], "ROLE_USER");
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let app = app!(config());
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body())
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"email": "lee@example.com", "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], AuthError::InvalidCredential.kind());
    }

    #[actix_web::test]
    async fn duplicate_signup_conflicts() {
        let app = app!(config());
        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(signup_body())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }
    }

    #[actix_web::test]
    async fn reissue_rotates_cookie_and_rejects_stale() {
        let app = app!(config());
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body())
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr(peer(CLIENT))
            .set_json(login_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        let first = refresh_of(&resp).expect("first refresh");

        let req = test::TestRequest::post()
            .uri("/api/auth/reissue")
            .peer_addr(peer(CLIENT))
            .cookie(Cookie::new(REFRESH_COOKIE, first.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let second = refresh_of(&resp).expect("second refresh");
        assert_ne!(first, second);

        let req = test::TestRequest::post()
            .uri("/api/auth/reissue")
            .peer_addr(peer(CLIENT))
            .cookie(Cookie::new(REFRESH_COOKIE, first))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], AuthError::RefreshTokenNotFound.kind());
    }

    #[actix_web::test]
    async fn reissue_without_cookie_is_missing_token() {
        let app = app!(config());
        let req = test::TestRequest::post().uri("/api/auth/reissue").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], AuthError::MissingToken.kind());
    }

    #[actix_web::test]
    async fn logout_clears_refresh_cookie() {
        let app = app!(config());
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body())
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        let refresh = refresh_of(&resp).expect("refresh");
        let body: Value = test::read_body_json(resp).await;
        let access = body["accessToken"].as_str().expect("access token").to_string();

        let req = test::TestRequest::post()
            .uri("/api/auth/logout")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(refresh_of(&resp).as_deref(), Some(""));

        let req = test::TestRequest::post()
            .uri("/api/auth/reissue")
            .cookie(Cookie::new(REFRESH_COOKIE, refresh))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn me_rejects_refresh_tokens() {
        let app = app!(config());
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body())
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        let refresh = refresh_of(&resp).expect("refresh");
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", refresh)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn kakao_redirects_with_both_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "provider-access",
                "token_type": "bearer",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/user/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "properties": {"nickname": "Park"},
                "kakao_account": {"email": "park@example.com", "gender": "female"},
            })))
            .mount(&server)
            .await;
        let mut config = config();
        config.client_origin = String::from("http://client.test");
        config.provider.token_uri = format!("{}/oauth/token", server.uri());
        config.provider.userinfo_uri = format!("{}/v2/user/me", server.uri());
        let app = app!(config);
        let req = test::TestRequest::get()
            .uri("/api/auth/kakao/login?code=authorization-code")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("http://client.test")
        );
        let names = resp
            .response()
            .cookies()
            .map(|c| c.name().to_string())
            .collect::<Vec<_>>();
        assert!(names.contains(&String::from(ACCESS_COOKIE)));
        assert!(names.contains(&String::from(REFRESH_COOKIE)));
    }

    macro_rules! signup_and_login {
        ($app:expr, $login:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(signup_body())
                .to_request();
            test::call_service($app, req).await;
            let req = $login
                .uri("/api/auth/login")
                .set_json(login_body())
                .to_request();
            let resp = test::call_service($app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            refresh_of(&resp).expect("refresh")
        }};
    }

    #[actix_web::test]
    async fn spoofed_forwarding_header_cannot_reissue() {
        let app = app!(config());
        let refresh = signup_and_login!(&app, test::TestRequest::post().peer_addr(peer(CLIENT)));
        let req = test::TestRequest::post()
            .uri("/api/auth/reissue")
            .peer_addr(peer(STRANGER))
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .insert_header(("X-Real-IP", "198.51.100.4"))
            .cookie(Cookie::new(REFRESH_COOKIE, refresh.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], AuthError::IpMismatch.kind());

        let req = test::TestRequest::post()
            .uri("/api/auth/reissue")
            .peer_addr(peer(CLIENT))
            .cookie(Cookie::new(REFRESH_COOKIE, refresh))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn trusted_proxy_forwards_client_address() {
        let mut config = config();
        config.trusted_proxies = vec![peer(PROXY).ip()];
        let app = app!(config);
        let login = test::TestRequest::post()
            .peer_addr(peer(PROXY))
            .insert_header(("X-Forwarded-For", "198.51.100.4"));
        let refresh = signup_and_login!(&app, login);

        let req = test::TestRequest::post()
            .uri("/api/auth/reissue")
            .peer_addr(peer(PROXY))
            .insert_header(("X-Forwarded-For", "203.0.113.66"))
            .cookie(Cookie::new(REFRESH_COOKIE, refresh.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/auth/reissue")
            .peer_addr(peer(PROXY))
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .cookie(Cookie::new(REFRESH_COOKIE, refresh))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn session_store_outage_is_service_unavailable() {
        let auth = Authenticator::new(config(), Roster::default(), crate::session::Outage)
            .expect("authenticator");
        let crypto = web::Data::new(auth.crypto().clone());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(auth))
                .app_data(crypto)
                .configure(routes::<Roster, crate::session::Outage>),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "STORE_UNAVAILABLE");
    }

    #[actix_web::test]
    async fn missing_verifier_is_misconfiguration() {
        let (auth, _) = service(config()).await;
        let app = test::init_service(
            App::new()
                .app_data(auth)
                .configure(routes::<Roster, Vault>),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", "Bearer whatever"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "MISCONFIGURED");
    }
}
