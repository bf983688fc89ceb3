use super::*;
use actix_web::FromRequest;
use actix_web::HttpRequest;
use actix_web::dev::Payload;
use actix_web::web;
use footlog_core::ID;
use std::future::Ready;
use std::future::ready;

/// Extractor for authenticated requests.
/// Accepts the access token from its cookie or an `Authorization: Bearer`
/// header, and rejects refresh tokens.
pub struct Auth(pub Claims);

impl Auth {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
    pub fn user(&self) -> ID<Member> {
        self.0.user()
    }
}

impl FromRequest for Auth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::authorize(req))
    }
}

impl Auth {
    fn authorize(req: &HttpRequest) -> Result<Self, AuthError> {
        let crypto = req.app_data::<web::Data<Crypto>>().ok_or_else(|| {
            log::error!("web::Data<Crypto> is not registered on the app");
            AuthError::Misconfigured(String::from("token verifier not registered"))
        })?;
        let token = Crypto::extract(req, ACCESS_COOKIE).ok_or(AuthError::MissingToken)?;
        let claims = crypto.verify(&token)?;
        match claims.kind() {
            Kind::Access => Ok(Auth(claims)),
            Kind::Refresh => Err(AuthError::NotAnAccessToken),
        }
    }
}
