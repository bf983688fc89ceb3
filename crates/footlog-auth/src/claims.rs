use super::*;
use footlog_core::ID;

/// Decoded token payload. Fully populated at verify time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub name: String,
    pub roles: Vec<Role>,
    pub typ: Kind,
    pub jti: uuid::Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: ID<Member>, name: String, roles: Vec<Role>, typ: Kind, iat: i64, exp: i64) -> Self {
        Self {
            sub: user.inner(),
            name,
            roles,
            typ,
            jti: uuid::Uuid::new_v4(),
            iat,
            exp,
        }
    }
    /// Zero skew: the expiry instant itself is already invalid.
    pub fn expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
    pub fn user(&self) -> ID<Member> {
        ID::from(self.sub)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
    pub fn kind(&self) -> Kind {
        self.typ
    }
}
