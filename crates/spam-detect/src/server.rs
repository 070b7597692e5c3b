//! HTTP surface of the detector.
//!
//! The [`Predictor`] is trained before the listener binds and shared
//! read-only between handlers. Classification is CPU bound, so it runs on
//! the blocking pool.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spam_classifier::{Label, Predictor};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

pub const STATUS: &str = "✅ Email Spam Detection API is running.";
const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub message: String,
    pub prediction: Label,
}

pub fn router(predictor: Arc<Predictor>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/", get(status))
        .route("/web", get(web))
        .with_state(predictor)
}

pub async fn serve(listener: TcpListener, predictor: Arc<Predictor>) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(predictor)).await?;
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub async fn predict(
    State(predictor): State<Arc<Predictor>>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let message = request.message.unwrap_or_default();
    if message.is_empty() {
        warn!("No message provided in request");
        return error_response(StatusCode::BAD_REQUEST, "No message provided");
    }
    debug!("Received message: {message}");

    let result = tokio::task::spawn_blocking({
        let message = message.clone();
        move || predictor.predict(&message)
    })
    .await;

    match result {
        Ok(Ok(prediction)) => {
            info!(%prediction, "Classified message");
            Json(PredictResponse {
                message,
                prediction,
            })
            .into_response()
        }
        Ok(Err(err)) if err.is_client_error() => {
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Ok(Err(err)) => {
            error!("Prediction failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(err) => {
            error!("Prediction task failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub async fn status() -> &'static str {
    STATUS
}

pub async fn web() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};
    use once_cell::sync::Lazy;
    use serde_json::Value;
    use spam_classifier::{train, ParamGrid, TrainingConfig};

    use super::*;

    const DATASET: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/spam.csv");

    static PREDICTOR: Lazy<Arc<Predictor>> = Lazy::new(|| {
        let config = TrainingConfig::default()
            .with_dataset(DATASET)
            .with_grid(ParamGrid {
                n_trees: vec![50, 100],
                max_depth: vec![None],
                min_samples_split: vec![2],
            });
        Arc::new(train(&config).expect("training failed").predictor)
    });

    async fn read_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Runs `body` through the `Json` extractor and the handler, as the
    /// router does for `POST /predict`.
    async fn post(body: &'static str) -> (StatusCode, Value) {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let extracted = Json::<PredictRequest>::from_request(request, &()).await;
        read_json(predict(State(PREDICTOR.clone()), extracted).await).await
    }

    async fn call(message: Option<&str>) -> (StatusCode, Value) {
        let request = PredictRequest {
            message: message.map(str::to_string),
        };
        read_json(predict(State(PREDICTOR.clone()), Ok(Json(request))).await).await
    }

    #[tokio::test]
    async fn classifies_spam() {
        let message = "URGENT!!! You have WON a FREE iPhone!!! Click HERE NOW!!!";
        let (status, body) = call(Some(message)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], message);
        assert_eq!(body["prediction"], "spam");
    }

    #[tokio::test]
    async fn classifies_safe() {
        let (status, body) = post(r#"{"message": "Can we schedule a call for tomorrow?"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "safe");
    }

    #[tokio::test]
    async fn missing_or_empty_message_is_rejected() {
        for message in [None, Some("")] {
            let (status, body) = call(message).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "No message provided");
        }
    }

    #[tokio::test]
    async fn empty_object_body_has_no_message() {
        for body in ["{}", r#"{"message": ""}"#, r#"{"message": null}"#] {
            let (status, json) = post(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["error"], "No message provided", "{body}");
        }
    }

    #[tokio::test]
    async fn malformed_bodies_are_client_errors() {
        for body in [r#"{"message": 5}"#, "not json", r#"["message"]"#] {
            let (status, json) = post(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(json["error"].is_string(), "{body}");
        }
    }

    #[tokio::test]
    async fn status_and_page() {
        assert_eq!(status().await, STATUS);
        let Html(page) = web().await;
        assert!(page.contains("/predict"));
    }
}
