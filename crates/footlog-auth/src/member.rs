use super::*;
use footlog_core::ID;
use footlog_core::Unique;

/// Registered account. Owned by the member repository; the auth core only
/// reads it and provisions new ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    id: ID<Self>,
    name: String,
    email: String,
    hashword: Option<String>,
    role: Role,
    gender: Gender,
    origin: Origin,
}

impl Member {
    pub fn new(id: ID<Self>, name: String, email: String) -> Self {
        Self {
            id,
            name,
            email,
            hashword: None,
            role: Role::default(),
            gender: Gender::default(),
            origin: Origin::default(),
        }
    }
    pub fn with_hashword(mut self, hashword: String) -> Self {
        self.hashword = Some(hashword);
        self
    }
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn hashword(&self) -> Option<&str> {
        self.hashword.as_deref()
    }
    pub fn role(&self) -> Role {
        self.role
    }
    pub fn gender(&self) -> Gender {
        self.gender
    }
    pub fn origin(&self) -> Origin {
        self.origin
    }
}

impl Unique for Member {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use footlog_pg::*;

    impl Schema for Member {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          UUID PRIMARY KEY,
                    name        VARCHAR(64) NOT NULL,
                    email       VARCHAR(255) UNIQUE NOT NULL,
                    hashword    TEXT,
                    role        VARCHAR(16) NOT NULL DEFAULT 'ROLE_USER',
                    gender      VARCHAR(8) NOT NULL DEFAULT 'UNKNOWN',
                    origin      VARCHAR(8) NOT NULL DEFAULT 'LOCAL'
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_users_email ON ",
                USERS,
                " (email);"
            )
        }
    }
}
