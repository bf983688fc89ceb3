/// How an account was first created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Origin {
    /// Email and password sign-up.
    #[default]
    Local,
    /// Provisioned on first Kakao login.
    Kakao,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Kakao => "KAKAO",
        }
    }
}

impl From<&str> for Origin {
    fn from(s: &str) -> Self {
        match s {
            "KAKAO" => Self::Kakao,
            _ => Self::Local,
        }
    }
}
