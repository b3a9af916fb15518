use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::error::ServerError;
use crate::files::resolver;
use crate::http::request::Request;
use crate::http::response::{ContentType, Response};

/// Serves files from one virtual-host directory per domain under `root`.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Builds the response for a GET request.
    ///
    /// Failures become empty-bodied error responses: 400 for an unusable
    /// host, 403 for targets escaping the host directory, 404 for missing
    /// files and 500 for any other I/O failure.
    pub async fn respond(&self, request: &Request) -> Response {
        match self.serve(request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    ServerError::ResourceNotFound(path) => {
                        debug!(host = %request.host, path = %path.display(), "Resource not found");
                    }
                    ServerError::Io(_) => {
                        error!(host = %request.host, target = %request.file_path, error = %e, "Failed to read resource");
                    }
                    _ => {
                        warn!(host = %request.host, target = %request.file_path, error = %e, "Rejected request");
                    }
                }
                Response::error(e.status())
            }
        }
    }

    /// Resolves and reads the resource, surfacing every failure.
    pub async fn serve(&self, request: &Request) -> Result<Response, ServerError> {
        let target = resolver::resolve(&self.root, request)?;
        let body = read_contained(&target.host_dir, &target.path).await?;

        let content_type = resolver::is_html(&target.path).then(ContentType::html);

        Ok(Response::ok(body, content_type))
    }
}

/// Reads `path` after checking that, with symlinks resolved, it still lies
/// under `host_dir`.
async fn read_contained(host_dir: &Path, path: &Path) -> Result<Vec<u8>, ServerError> {
    let canonical = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| classify(e, path))?;
    let canonical_dir = tokio::fs::canonicalize(host_dir)
        .await
        .map_err(|e| classify(e, path))?;

    if !canonical.starts_with(&canonical_dir) {
        return Err(ServerError::Forbidden(path.display().to_string()));
    }

    tokio::fs::read(&canonical).await.map_err(|e| classify(e, path))
}

fn classify(err: io::Error, path: &Path) -> ServerError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            ServerError::ResourceNotFound(path.to_path_buf())
        }
        _ => ServerError::Io(err),
    }
}
