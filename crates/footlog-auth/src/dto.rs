use serde::Deserialize;
use serde::Serialize;

pub const GRANT_TYPE: &str = "Bearer";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CodeQuery {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    pub grant_type: String,
    pub access_token: String,
    pub access_token_valid_time: u64,
    pub refresh_token_valid_time: u64,
    pub user_id: uuid::Uuid,
}

#[derive(Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub roles: Vec<crate::Role>,
}
