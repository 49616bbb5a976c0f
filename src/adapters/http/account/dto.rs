//! Data transfer objects for the auth endpoints.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub plan: String,
    pub card_last4: Option<String>,
    pub credit_card_token: Option<String>,
    pub billing_zip: Option<String>,
    pub expiry_month: Option<i32>,
    pub expiry_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
