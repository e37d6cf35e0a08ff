use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{ExportFormat, FollowUpStep},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{GenerationReply, ScreenplayRequest},
};
use tokio::sync::RwLock;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

mod config;
mod draft;
mod generation;

use config::load_settings;
use draft::ProjectDraft;
use generation::{
    characters_prompt, director_prompt, mock_characters, mock_director_notes, mock_pitch_deck,
    mock_screenplay, mock_sound_design, pitch_deck_prompt, screenplay_prompt, sound_design_prompt,
    Generator, PromptSpec,
};

struct AppState {
    generator: Generator,
    draft: RwLock<ProjectDraft>,
}

const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let generator = Generator::new(&settings)?;
    let state = AppState {
        generator,
        draft: RwLock::new(ProjectDraft::default()),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, ollama_url = %settings.ollama_url, "studio server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/generate_screenplay", post(http_generate_screenplay))
        .route("/generate_characters", post(http_generate_characters))
        .route("/generate_director_mode", post(http_generate_director_mode))
        .route("/generate_sound_design", post(http_generate_sound_design))
        .route("/generate_pitch_deck", post(http_generate_pitch_deck))
        .route("/export/:format", get(http_export_bible))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_generate_screenplay(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScreenplayRequest>,
) -> Result<Json<GenerationReply>, (StatusCode, Json<ApiError>)> {
    let story = req.story.trim();
    if story.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                "story concept must not be empty",
            )),
        ));
    }

    info!(genre = %req.genre, story_len = story.len(), "generating screenplay");
    let prompt = screenplay_prompt(story, &req.genre);
    let content = state
        .generator
        .generate_or_fallback(&prompt, || mock_screenplay(story, &req.genre))
        .await;

    let mut draft = state.draft.write().await;
    draft.story = Some(story.to_string());
    draft.genre = Some(req.genre.clone());
    draft.screenplay = Some(content.clone());

    Ok(Json(GenerationReply::content(content)))
}

/// Resolve the step's prerequisite from the draft and produce its prompt and
/// mock fallback. Fails when the seeding step has not run yet.
async fn prepare_follow_up(
    state: &AppState,
    step: FollowUpStep,
) -> Result<(PromptSpec, String), ApiException> {
    let draft = state.draft.read().await;
    match step {
        FollowUpStep::Characters => {
            let story = draft.story.clone().ok_or_else(|| {
                ApiException::new(ErrorCode::Validation, "No story found in draft")
            })?;
            Ok((characters_prompt(&story), mock_characters()))
        }
        FollowUpStep::DirectorMode => {
            let screenplay = draft.screenplay.clone().ok_or_else(|| {
                ApiException::new(ErrorCode::Validation, "No screenplay found in draft")
            })?;
            Ok((director_prompt(&screenplay), mock_director_notes()))
        }
        FollowUpStep::SoundDesign => {
            let screenplay = draft.screenplay.clone().ok_or_else(|| {
                ApiException::new(ErrorCode::Validation, "No screenplay found in draft")
            })?;
            Ok((sound_design_prompt(&screenplay), mock_sound_design()))
        }
        FollowUpStep::PitchDeck => {
            let story = draft.story.clone().ok_or_else(|| {
                ApiException::new(ErrorCode::Validation, "No story found in draft")
            })?;
            Ok((pitch_deck_prompt(&story), mock_pitch_deck()))
        }
    }
}

async fn run_follow_up(
    state: Arc<AppState>,
    step: FollowUpStep,
) -> (StatusCode, Json<GenerationReply>) {
    let (prompt, fallback) = match prepare_follow_up(&state, step).await {
        Ok(prepared) => prepared,
        Err(exception) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(GenerationReply::failure(exception.message)),
            );
        }
    };

    info!(step = %step.step(), "generating follow-up content");
    let content = state
        .generator
        .generate_or_fallback(&prompt, move || fallback)
        .await;
    state
        .draft
        .write()
        .await
        .set_section(step.step(), content.clone());

    (StatusCode::OK, Json(GenerationReply::content(content)))
}

async fn http_generate_characters(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<GenerationReply>) {
    run_follow_up(state, FollowUpStep::Characters).await
}

async fn http_generate_director_mode(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<GenerationReply>) {
    run_follow_up(state, FollowUpStep::DirectorMode).await
}

async fn http_generate_sound_design(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<GenerationReply>) {
    run_follow_up(state, FollowUpStep::SoundDesign).await
}

async fn http_generate_pitch_deck(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<GenerationReply>) {
    run_follow_up(state, FollowUpStep::PitchDeck).await
}

async fn http_export_bible(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let Some(format) = ExportFormat::from_path_segment(&format) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                "unsupported export format",
            )),
        ));
    };

    let document = state
        .draft
        .read()
        .await
        .render_bible(format)
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(ErrorCode::Validation, "No content to export")),
            )
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.mime_type()),
    );
    let disposition = format!(
        "attachment; filename=\"project_bible.{}\"",
        format.path_segment()
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, "invalid header value")),
            )
        })?,
    );

    Ok((headers, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let mut settings = config::Settings::default();
        // Discard port on loopback refuses connections immediately, which
        // forces every generation onto the mock fallback path.
        settings.ollama_url = "http://127.0.0.1:9/api/generate".into();
        settings.ollama_timeout_seconds = 1;

        let state = AppState {
            generator: Generator::new(&settings).expect("generator"),
            draft: RwLock::new(ProjectDraft::default()),
        };
        build_router(Arc::new(state))
    }

    fn screenplay_request(story: &str, genre: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate_screenplay")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&ScreenplayRequest {
                    story: story.to_string(),
                    genre: genre.to_string(),
                })
                .expect("body"),
            ))
            .expect("request")
    }

    fn empty_post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn reply_of(response: axum::response::Response) -> GenerationReply {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("reply json")
    }

    #[tokio::test]
    async fn healthz_responds_ok() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn blank_story_is_rejected_before_generation() {
        let app = test_router();
        let response = app
            .oneshot(screenplay_request("   ", "drama"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let error: ApiError = serde_json::from_slice(&bytes).expect("error json");
        assert!(matches!(error.code, ErrorCode::Validation));
    }

    #[tokio::test]
    async fn screenplay_serves_mock_content_when_ollama_is_unreachable() {
        let app = test_router();
        let response = app
            .oneshot(screenplay_request("A heist on a moving train", "thriller"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let reply = reply_of(response).await;
        let content = reply.content.expect("content");
        assert!(content.contains("A heist on a moving train"));
        assert!(content.contains("thriller"));
        assert!(reply.error.is_none());
    }

    #[tokio::test]
    async fn follow_up_without_story_reports_error_field() {
        let app = test_router();
        let response = app
            .oneshot(empty_post("/generate_characters"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let reply = reply_of(response).await;
        assert_eq!(reply.error.as_deref(), Some("No story found in draft"));
        assert!(reply.content.is_none());
    }

    #[tokio::test]
    async fn director_mode_requires_a_generated_screenplay() {
        let app = test_router();
        let response = app
            .oneshot(empty_post("/generate_director_mode"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let reply = reply_of(response).await;
        assert_eq!(reply.error.as_deref(), Some("No screenplay found in draft"));
    }

    #[tokio::test]
    async fn chain_succeeds_once_screenplay_seeds_the_draft() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(screenplay_request("A lighthouse keeper", "drama"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        for uri in [
            "/generate_characters",
            "/generate_director_mode",
            "/generate_sound_design",
            "/generate_pitch_deck",
        ] {
            let response = app
                .clone()
                .oneshot(empty_post(uri))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let reply = reply_of(response).await;
            assert!(reply.content.is_some(), "{uri}");
        }
    }

    #[tokio::test]
    async fn export_before_any_generation_is_rejected() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/export/txt")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_returns_attachment_with_generated_sections() {
        let app = test_router();
        app.clone()
            .oneshot(screenplay_request("A lighthouse keeper", "drama"))
            .await
            .expect("screenplay");
        app.clone()
            .oneshot(empty_post("/generate_characters"))
            .await
            .expect("characters");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/export/txt")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .expect("disposition");
        assert!(disposition.contains("project_bible.txt"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let document = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert!(document.contains("SCREENPLAY"));
        assert!(document.contains("CHARACTER PROFILES"));
    }

    #[tokio::test]
    async fn unknown_export_format_is_rejected() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/export/pdf")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
