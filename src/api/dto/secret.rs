use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SecretResponse {
    pub message: String,
}

impl SecretResponse {
    pub fn for_user(email: &str) -> Self {
        Self {
            message: format!("our hidden value for the user {email}"),
        }
    }
}
