use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{info, warn};

use super::models::{
    ErrorResponse, ExplainRequest, ExplainResponse, FavouriteResponse, HistoryResponse,
    LanguagesResponse, SpeechRequest, SpeechResponse, TranscribeRequest, TranscribeResponse,
    TranslateRequest, TranslateResponse, UploadRequest,
};
use super::state::ServerState;
use crate::error::{ErrorKind, WordWeaveError};
use crate::languages::{LANGUAGE_NAMES, TONE_NAMES};
use crate::service::Upload;

pub fn router(state: ServerState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate))
        .route("/translate/image", post(translate_image))
        .route("/translate/document", post(translate_document))
        .route("/explain", post(explain))
        .route("/text-to-speech", post(text_to_speech))
        .route("/speech-to-text", post(speech_to_text))
        .route("/history", get(history))
        .route("/favourites", get(favourites).post(save_favourite))
        .route("/languages", get(languages))
        .with_state(state)
        .layer(body_limit)
        .layer(axum::middleware::from_fn(cors_middleware))
}

pub async fn run_server(state: ServerState, addr: String) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind server address: {}", addr))?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Error body plus the status derived from the error kind.
#[derive(Debug)]
pub(crate) struct ServerError {
    status: StatusCode,
    message: String,
}

impl ServerError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<WordWeaveError> for ServerError {
    fn from(err: WordWeaveError) -> Self {
        let status = match err.kind() {
            ErrorKind::Validation | ErrorKind::Content => StatusCode::BAD_REQUEST,
            ErrorKind::State => StatusCode::NOT_FOUND,
            ErrorKind::Backend => StatusCode::BAD_GATEWAY,
        };
        if status == StatusCode::BAD_GATEWAY {
            warn!("backend failure: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ServerError>;

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type"),
    );
}

fn decode_payload(data_base64: &str) -> std::result::Result<Vec<u8>, ServerError> {
    BASE64
        .decode(data_base64.trim())
        .map_err(|err| ServerError::bad_request(format!("invalid base64 payload: {}", err)))
}

async fn translate(
    State(state): State<ServerState>,
    Json(payload): Json<TranslateRequest>,
) -> ApiResult<TranslateResponse> {
    let translated_text = state
        .service
        .translate(
            &payload.text,
            &payload.source_language,
            &payload.target_language,
            &payload.tone,
        )
        .await?;
    Ok(Json(TranslateResponse { translated_text }))
}

async fn translate_image(
    State(state): State<ServerState>,
    Json(payload): Json<UploadRequest>,
) -> ApiResult<TranslateResponse> {
    let bytes = decode_payload(&payload.data_base64)?;
    let extension = payload.extension_hint();
    let upload = Upload {
        bytes: &bytes,
        extension: &extension,
        file_name: payload.data_name.as_deref(),
    };
    let translated_text = state
        .service
        .translate_from_image(
            upload,
            &payload.source_language,
            &payload.target_language,
            &payload.tone,
        )
        .await?;
    Ok(Json(TranslateResponse { translated_text }))
}

async fn translate_document(
    State(state): State<ServerState>,
    Json(payload): Json<UploadRequest>,
) -> ApiResult<TranslateResponse> {
    let bytes = decode_payload(&payload.data_base64)?;
    let extension = payload.extension_hint();
    let upload = Upload {
        bytes: &bytes,
        extension: &extension,
        file_name: payload.data_name.as_deref(),
    };
    let translated_text = state
        .service
        .translate_from_document(
            upload,
            &payload.source_language,
            &payload.target_language,
            &payload.tone,
        )
        .await?;
    Ok(Json(TranslateResponse { translated_text }))
}

async fn explain(
    State(state): State<ServerState>,
    Json(payload): Json<ExplainRequest>,
) -> ApiResult<ExplainResponse> {
    let explanation = state
        .service
        .explain(
            &payload.text,
            &payload.source_language,
            &payload.target_language,
        )
        .await?;
    Ok(Json(ExplainResponse { explanation }))
}

async fn text_to_speech(
    State(state): State<ServerState>,
    Json(payload): Json<SpeechRequest>,
) -> ApiResult<SpeechResponse> {
    let audio = state
        .service
        .synthesize_speech(&payload.text, &payload.language)
        .await?;
    Ok(Json(SpeechResponse {
        audio_base64: BASE64.encode(&audio),
        mime: "audio/wav".to_string(),
    }))
}

async fn speech_to_text(
    State(state): State<ServerState>,
    Json(payload): Json<TranscribeRequest>,
) -> ApiResult<TranscribeResponse> {
    let bytes = decode_payload(&payload.data_base64)?;
    let text = state.service.transcribe(&bytes).await?;
    Ok(Json(TranscribeResponse { text }))
}

async fn history(State(state): State<ServerState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        formatted: state.service.history(),
        entries: state.service.history_store().entries(),
    })
}

async fn favourites(State(state): State<ServerState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        formatted: state.service.favourites(),
        entries: state.service.history_store().favourite_entries(),
    })
}

async fn save_favourite(State(state): State<ServerState>) -> ApiResult<FavouriteResponse> {
    let outcome = state.service.save_latest_to_favourites()?;
    Ok(Json(FavouriteResponse {
        outcome,
        message: outcome.message().to_string(),
    }))
}

async fn languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: LANGUAGE_NAMES.to_vec(),
        tones: TONE_NAMES.to_vec(),
    })
}
