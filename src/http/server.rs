//! HTTP API Server for the reader emulator
//!
//! Provides REST endpoints for lifecycle control, broker and webhook
//! settings, reference-list management, and the streaming live feed.

use crate::{
    config::{prune_empty, MqttSettings, WebhookSettings},
    http::stubs,
    mqtt::MqttPublisher,
    sources::ListKind,
    state::{ReaderState, EVENT_INTERVAL},
};
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Broker slice of the status response
#[derive(Debug, Serialize)]
pub struct MqttStatus {
    pub active: bool,
    #[serde(rename = "connectionState")]
    pub connection_state: &'static str,
}

/// Webhook slice of the status response
#[derive(Debug, Serialize)]
pub struct WebhookStatus {
    pub active: bool,
    #[serde(rename = "lastStatusCode")]
    pub last_status_code: u16,
    #[serde(rename = "lastDeliveryTimestamp")]
    pub last_delivery_timestamp: Option<String>,
}

/// Response for the status query
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub mqtt: MqttStatus,
    pub webhook: WebhookStatus,
}

/// Custom error type for API errors
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// Create the HTTP server with all routes
pub fn create_server(state: Arc<ReaderState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/v1/data/stream", get(data_stream))
        .route("/api/v1/profiles/inventory/presets/:preset_id/start", post(start_stream))
        .route("/api/v1/profiles/stop", post(stop_stream))
        .route("/api/v1/mqtt", get(get_mqtt_settings).put(put_mqtt_settings))
        .route("/api/v1/webhooks/event", get(get_webhook_settings).put(put_webhook_settings))
        .route("/api/v1/status", get(get_status))
        .route(
            "/api/v1/ref-lists/:list_kind",
            get(get_reference_list)
                .post(replace_reference_list)
                .put(append_reference_list)
                .delete(delete_reference_list),
        )
        .route("/api/v1/openapi.json", get(stubs::openapi_document))
        .route("/api/v1/profiles", get(stubs::list_profiles))
        .route("/api/v1/system", get(stubs::system_info))
        .route(
            "/api/v1/system/access/authentication",
            get(stubs::get_authentication_config).put(stubs::put_authentication_config),
        )
        .route("/api/v1/system/access/users", get(stubs::list_users))
        .route("/api/v1/system/access/users/:user_id/password", axum::routing::put(stubs::put_user_password))
        .route(
            "/api/v1/system/certificates/ca/certs",
            get(stubs::list_ca_certificates).post(stubs::upload_ca_certificate),
        )
        .route(
            "/api/v1/system/certificates/ca/certs/:cert_id",
            get(stubs::get_ca_certificate).delete(stubs::delete_ca_certificate),
        )
        .route(
            "/api/v1/system/certificates/tls/certs",
            get(stubs::list_tls_certificates).post(stubs::upload_tls_certificate),
        )
        .route(
            "/api/v1/system/certificates/tls/certs/:cert_id",
            get(stubs::get_tls_certificate).delete(stubs::delete_tls_certificate),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /api/v1/data/stream - live feed of tag events
///
/// One JSON frame followed by a blank line per event, at the fixed event
/// interval, for as long as the lifecycle stays running. Each connected
/// caller gets an independent sequence over the shared selector.
async fn data_stream(State(state): State<Arc<ReaderState>>) -> impl IntoResponse {
    let stream = futures_util::stream::unfold((state, true), |(state, first)| async move {
        if !first {
            tokio::time::sleep(EVENT_INTERVAL).await;
        }
        if !state.is_running() {
            return None;
        }
        let event = state.next_event()?;
        let mut frame = serde_json::to_string(&event).ok()?;
        frame.push_str("\n\n");
        Some((Ok::<_, std::convert::Infallible>(Bytes::from(frame)), (state, false)))
    });

    ([(header::CONTENT_TYPE, "text/event-stream")], Body::from_stream(stream))
}

/// POST /api/v1/profiles/inventory/presets/:preset_id/start - start streaming
async fn start_stream(
    State(state): State<Arc<ReaderState>>,
    Path(preset_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if preset_id != "default" {
        return Err(ApiError::NotFound(format!("Preset '{}' not found", preset_id)));
    }
    state.start_session().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/profiles/stop - stop streaming (idempotent)
async fn stop_stream(State(state): State<Arc<ReaderState>>) -> StatusCode {
    state.stop_session();
    StatusCode::NO_CONTENT
}

/// GET /api/v1/mqtt - current broker settings
async fn get_mqtt_settings(State(state): State<Arc<ReaderState>>) -> Json<MqttSettings> {
    Json(state.mqtt_settings())
}

/// PUT /api/v1/mqtt - replace the broker settings wholesale
///
/// Empty and null values are pruned before the replacement is stored, and
/// the publisher task is respawned against the new configuration.
async fn put_mqtt_settings(
    State(state): State<Arc<ReaderState>>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let settings: MqttSettings = serde_json::from_value(prune_empty(payload))
        .map_err(|e| ApiError::BadRequest(format!("Invalid MQTT settings: {}", e)))?;

    state
        .replace_mqtt_settings(settings)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    MqttPublisher::respawn(&state);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/webhooks/event - current webhook settings
async fn get_webhook_settings(State(state): State<Arc<ReaderState>>) -> Json<WebhookSettings> {
    Json(state.webhook_settings())
}

/// PUT /api/v1/webhooks/event - replace the webhook settings wholesale
async fn put_webhook_settings(
    State(state): State<Arc<ReaderState>>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let settings: WebhookSettings = serde_json::from_value(prune_empty(payload))
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook settings: {}", e)))?;

    state
        .replace_webhook_settings(settings)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/status - lifecycle, broker and delivery status
async fn get_status(State(state): State<Arc<ReaderState>>) -> Json<StatusResponse> {
    let delivery = state.delivery_status();
    Json(StatusResponse {
        status: if state.is_running() { "running" } else { "idle" },
        mqtt: MqttStatus {
            active: state.mqtt_settings().active(),
            connection_state: state.broker_connection().as_str(),
        },
        webhook: WebhookStatus {
            active: state.webhook_settings().active(),
            last_status_code: delivery.last_status_code,
            last_delivery_timestamp: delivery.last_delivery_timestamp,
        },
    })
}

fn parse_kind(segment: &str) -> Result<ListKind, ApiError> {
    ListKind::from_route(segment).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid list type '{}'. Use 'default' or 'unique'", segment))
    })
}

fn parse_entries(payload: Value) -> Result<Vec<String>, ApiError> {
    let Value::Array(items) = payload else {
        return Err(ApiError::BadRequest(
            "Invalid data format. Expected a list of EPC hex strings".to_string(),
        ));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(ApiError::BadRequest(
                "Invalid data format. Expected a list of EPC hex strings".to_string(),
            )),
        })
        .collect()
}

/// GET /api/v1/ref-lists/:list_kind - full list contents
async fn get_reference_list(
    State(state): State<Arc<ReaderState>>,
    Path(list_kind): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let kind = parse_kind(&list_kind)?;
    state.lists().read(kind).map(Json).map_err(|e| ApiError::InternalError(e.to_string()))
}

/// POST /api/v1/ref-lists/:list_kind - replace the list contents
async fn replace_reference_list(
    State(state): State<Arc<ReaderState>>,
    Path(list_kind): Path<String>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&list_kind)?;
    let entries = parse_entries(payload)?;
    state
        .lists()
        .replace(kind, &entries)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/ref-lists/:list_kind - append to the list
async fn append_reference_list(
    State(state): State<Arc<ReaderState>>,
    Path(list_kind): Path<String>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&list_kind)?;
    let entries = parse_entries(payload)?;
    state
        .lists()
        .append(kind, &entries)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/ref-lists/:list_kind - delete the list
async fn delete_reference_list(
    State(state): State<Arc<ReaderState>>,
    Path(list_kind): Path<String>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&list_kind)?;
    state.lists().delete(kind).map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Start the HTTP server on the specified address
pub async fn start_server(
    addr: &str,
    state: Arc<ReaderState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Reader emulator API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
