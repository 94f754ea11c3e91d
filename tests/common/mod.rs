//! Fake answer service for integration tests.
//!
//! Runs an axum server on its own tokio runtime thread so the blocking
//! client under test never runs inside an async context.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use axum::{
    Json, Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;

static NO_PROXY: Once = Once::new();

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub question: String,
}

/// Answers like the single-agent backend, with a few questions that trigger
/// special behavior.
async fn query(Json(body): Json<QueryBody>) -> axum::response::Response {
    match body.question.as_str() {
        "Who won?" => Json(json!({ "answer": "Team A" })).into_response(),
        "no answer" => Json(json!({ "status": "ok" })).into_response(),
        "server error" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "<html>Internal Server Error</html>").into_response()
        }
        "not found json" => {
            (StatusCode::NOT_FOUND, Json(json!({ "answer": "Not Found" }))).into_response()
        }
        "stream" => (
            [(header::CONTENT_TYPE, "text/event-stream")],
            concat!(
                "data: {\"supervisor\": {\"next\": \"research_team\"}}\n\n",
                "data: {\"research_team\": \"Collected sources\"}\n\n",
                "data: {\"writing_team\": \"Report drafted\"}\n\n",
            ),
        )
            .into_response(),
        question => {
            if let Some(rest) = question.strip_prefix("sleep ") {
                let millis = rest.parse::<u64>().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(millis)).await;
            }
            Json(json!({ "answer": format!("You asked: {question}") })).into_response()
        }
    }
}

/// Starts the fake service and returns its base URL.
pub fn spawn_answer_service() -> String {
    NO_PROXY.call_once(|| unsafe {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    });

    let (tx, rx) = std::sync::mpsc::channel::<SocketAddr>();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to build runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind");
            tx.send(listener.local_addr().expect("local addr"))
                .expect("failed to report address");
            let app = Router::new().route("/api/query", post(query));
            let _ = axum::serve(listener, app).await;
        });
    });

    let addr = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("server did not start");
    format!("http://{addr}")
}

/// Returns a URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
