//! Static front-end hosting.
//!
//! Serves the built single-page application from one directory. Unknown
//! extension-less routes fall back to `index.html` so client-side routing
//! works; anything under `/api` is never answered from disk.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::app::AppState;
use crate::config::FrontendConfig;

/// Serve static files with SPA fallback.
pub async fn serve_frontend(State(state): State<AppState>, uri: Uri) -> Response {
    let config = &state.config.frontend;
    let path = uri.path().trim_start_matches('/');

    if is_api_path(path) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let base_dir = PathBuf::from(&config.static_dir);
    if !base_dir.exists() {
        warn!(dir = %base_dir.display(), "Frontend directory does not exist");
        return (StatusCode::SERVICE_UNAVAILABLE, "Frontend not available").into_response();
    }

    let file_path = if path.is_empty() {
        base_dir.join("index.html")
    } else {
        base_dir.join(path)
    };

    if !is_safe_path(&base_dir, &file_path) {
        warn!(
            requested_path = %file_path.display(),
            base_dir = %base_dir.display(),
            "Path traversal attempt detected"
        );
        return StatusCode::FORBIDDEN.into_response();
    }

    if let Ok(response) = serve_file(&file_path, config).await {
        return response;
    }

    // Routes without an extension belong to the client-side router.
    if !path.contains('.') {
        if let Ok(response) = serve_file(&base_dir.join("index.html"), config).await {
            return response;
        }
    }

    StatusCode::NOT_FOUND.into_response()
}

fn is_api_path(path: &str) -> bool {
    path == "api" || path.starts_with("api/")
}

/// Serve a single file with appropriate cache headers.
async fn serve_file(path: &Path, config: &FrontendConfig) -> Result<Response, std::io::Error> {
    let content = fs::read(path).await?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let cache_control = if is_immutable_asset(path) {
        format!(
            "public, max-age={}, immutable",
            config.immutable_cache_max_age
        )
    } else {
        format!("public, max-age={}", config.mutable_cache_max_age)
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, cache_control),
        ],
        Body::from(content),
    )
        .into_response())
}

/// Check if path is within base directory (prevent path traversal).
fn is_safe_path(base: &Path, path: &Path) -> bool {
    if path.exists() {
        match (base.canonicalize(), path.canonicalize()) {
            (Ok(canonical_base), Ok(canonical_path)) => canonical_path.starts_with(canonical_base),
            _ => false,
        }
    } else {
        normalize_path(path).starts_with(normalize_path(base))
    }
}

/// Normalize a path by removing . and .. components
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            component => result.push(component),
        }
    }
    result
}

/// Bundlers emit content-hashed files under `assets/`.
fn is_immutable_asset(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == "assets"))
}
