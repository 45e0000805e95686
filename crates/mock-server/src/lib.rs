//! Local mock API server for client tests.
//!
//! Serves the small REST surface the integration tests drive, a SOAP-style
//! number-conversion endpoint answering with a literal XML envelope, and a
//! WebSocket echo route.

use axum::Router;
use axum::extract::Path;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const NUMBER_TO_WORDS_RESPONSE: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <NumberToWordsResponse xmlns="http://www.dataaccess.com/webservicesserver/">
      <NumberToWordsResult>two hundred and fifty six</NumberToWordsResult>
    </NumberToWordsResponse>
  </soap:Body>
</soap:Envelope>"#;

/// Builds the mock router.
#[must_use]
pub fn app() -> Router {
    Router::new()
        .route("/api/v2/breeds", get(list_breeds))
        .route("/api/v2/breeds/{id}", get(get_breed))
        .route("/api/v2/facts", get(list_facts))
        .route(
            "/webservicesserver/numberconversion.wso",
            post(number_conversion),
        )
        .route("/ws", any(ws_echo))
        .fallback(not_found)
}

/// Serves the mock app on `listener` until the process ends.
///
/// # Errors
///
/// Returns the underlying I/O error if serving fails.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_breeds() -> axum::Json<Value> {
    axum::Json(json!({ "breeds": [] }))
}

async fn get_breed(Path(id): Path<String>) -> axum::Json<Value> {
    axum::Json(json!({ "id": id }))
}

async fn list_facts() -> axum::Json<Value> {
    axum::Json(json!({ "facts": [] }))
}

async fn number_conversion(body: String) -> Response {
    tracing::debug!(envelope = %body, "number conversion request");
    (
        [(header::CONTENT_TYPE, "text/xml")],
        NUMBER_TO_WORDS_RESPONSE,
    )
        .into_response()
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

async fn ws_echo(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(echo)
}

async fn echo(mut socket: WebSocket) {
    while let Some(Ok(message)) = socket.recv().await {
        let reply = match message {
            Message::Text(text) => Message::Text(text),
            Message::Binary(data) => Message::Binary(data),
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => continue,
        };
        if socket.send(reply).await.is_err() {
            break;
        }
    }
}
