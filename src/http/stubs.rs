//! Static request/response glue
//!
//! Endpoints real readers expose but the emulator only needs to answer
//! plausibly: API documentation, profile listing, system information and
//! user/authentication management. No internal logic, no state.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// GET /api/v1/openapi.json
pub async fn openapi_document() -> Json<Value> {
    Json(json!({"swagger": "2.0", "info": {"version": "1.8.0"}}))
}

/// GET /api/v1/profiles
pub async fn list_profiles() -> Json<Value> {
    Json(json!(["inventory", "location", "direction"]))
}

/// GET /api/v1/system
pub async fn system_info() -> Json<Value> {
    Json(json!({"systemInfo": "Details about the reader hardware"}))
}

/// GET /api/v1/system/access/authentication
pub async fn get_authentication_config() -> Json<Value> {
    Json(json!({"authConfig": "Current authentication configuration"}))
}

/// PUT /api/v1/system/access/authentication
pub async fn put_authentication_config(Json(_payload): Json<Value>) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /api/v1/system/access/users
pub async fn list_users() -> Json<Value> {
    Json(json!([{"userId": 1, "username": "admin"}]))
}

/// PUT /api/v1/system/access/users/:user_id/password
pub async fn put_user_password(
    Path(_user_id): Path<u32>,
    Json(_payload): Json<Value>,
) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /api/v1/system/certificates/ca/certs
pub async fn list_ca_certificates() -> Json<Value> {
    Json(json!([{"certId": 1, "certInfo": "CA Certificate info"}]))
}

/// POST /api/v1/system/certificates/ca/certs
///
/// The upload body is accepted and discarded.
pub async fn upload_ca_certificate() -> Json<Value> {
    Json(json!([{"certId": 1}]))
}

/// GET /api/v1/system/certificates/ca/certs/:cert_id
pub async fn get_ca_certificate(Path(cert_id): Path<u32>) -> Json<Value> {
    Json(json!({"certId": cert_id, "certInfo": "CA Certificate info"}))
}

/// DELETE /api/v1/system/certificates/ca/certs/:cert_id
pub async fn delete_ca_certificate(Path(_cert_id): Path<u32>) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /api/v1/system/certificates/tls/certs
pub async fn list_tls_certificates() -> Json<Value> {
    Json(json!([{"certId": 1, "certInfo": "TLS Certificate info"}]))
}

/// POST /api/v1/system/certificates/tls/certs
///
/// The upload body (certificate plus optional password) is accepted and
/// discarded.
pub async fn upload_tls_certificate() -> Json<Value> {
    Json(json!([{"certId": 1}]))
}

/// GET /api/v1/system/certificates/tls/certs/:cert_id
pub async fn get_tls_certificate(Path(cert_id): Path<u32>) -> Json<Value> {
    Json(json!({"certId": cert_id, "certInfo": "TLS Certificate info"}))
}

/// DELETE /api/v1/system/certificates/tls/certs/:cert_id
pub async fn delete_tls_certificate(Path(_cert_id): Path<u32>) -> StatusCode {
    StatusCode::NO_CONTENT
}
