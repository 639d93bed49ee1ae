use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

pub mod admin;
pub mod category;
pub mod course;
pub mod payment;
pub mod people;
pub mod rules;

/// Envelope every `/api` route answers with: `{ success, data | error }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse { success: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>) -> Self {
        ApiResponse { success: false, data: None, error: Some(error.into()) }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct JWTClaims{
    pub sub: String,
    pub exp: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SignupResponse{
    pub message: String,
    pub id: Uuid,
}

#[derive(Deserialize, Serialize)]
pub struct EmailAndPassword{
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct SigninResponse{
    pub message: String,
    pub token: String,
}

/// Identity of the signed-in admin, stored in request extensions by the session middleware.
#[derive(Debug, Serialize, Clone)]
pub struct SessionAdmin{
    pub email: String,
}

/// Body of a successful DELETE.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Deleted{
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_decodes_for_any_payload() {
        let body: ApiResponse<Deleted> =
            serde_json::from_str(r#"{"success":false,"error":"course not found"}"#).unwrap();
        assert!(!body.success);
        assert!(body.data.is_none());
        assert_eq!(body.error.as_deref(), Some("course not found"));

        let id = Uuid::new_v4();
        let body: ApiResponse<Deleted> = serde_json::from_value(serde_json::json!({ "success": true, "data": { "id": id } })).unwrap();
        assert_eq!(body.data, Some(Deleted { id }));
        assert!(body.error.is_none());
    }
}
