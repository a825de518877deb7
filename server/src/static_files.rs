//! Serves files from the www root for every target that is not an API path.
//!
//! Lookup, `index.html` defaults, content types and conditional requests are
//! left to [`ServeDir`]. This module only rejects targets that climb out of
//! the root and turns bare 404s into a readable reply.

use crate::api::ApiResponse;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use log::debug;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// The target could not be mapped to a file inside the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPath;

/// Rejects targets whose decoded path leaves the root through `..`.
///
/// The query string is ignored. Paths that go down and back up again
/// (`/css/../index.html`) are fine.
pub fn check_target(target: &str) -> Result<(), InvalidPath> {
    let path = target.split_once('?').map_or(target, |(path, _)| path);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| InvalidPath)?;

    let mut depth = 0usize;
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::ParentDir => depth = depth.checked_sub(1).ok_or(InvalidPath)?,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return Err(InvalidPath),
        }
    }
    Ok(())
}

pub struct StaticFiles {
    root: PathBuf,
    dir: ServeDir,
}

impl StaticFiles {
    /// Fails if `root` does not exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        let dir = ServeDir::new(&root);
        Ok(Self { root, dir })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn serve(&self, method: Method, target: &str, headers: HeaderMap) -> Response {
        if check_target(target).is_err() {
            return ApiResponse::text(StatusCode::BAD_REQUEST, "Invalid path").into_response();
        }

        let mut request = match Request::builder().method(method).uri(target).body(Body::empty()) {
            Ok(request) => request,
            Err(err) => {
                debug!("Cannot build file request for {}: {}", target, err);
                return ApiResponse::text(StatusCode::BAD_REQUEST, "Invalid path").into_response();
            }
        };
        *request.headers_mut() = headers;

        let response = match self.dir.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No file under {} for {}", self.root.display(), target);
            return ApiResponse::text(StatusCode::NOT_FOUND, "File not found").into_response();
        }
        response.map(Body::new)
    }
}
