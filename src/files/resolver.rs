//! Maps a request onto the filesystem.
//!
//! The resolved path is `root / host / target`, with `index.html` appended
//! when the target ends in a separator. `.` and `..` segments are folded
//! lexically; folding past the host directory is refused.

use std::path::{Component, Path, PathBuf};

use crate::error::ServerError;
use crate::http::request::Request;

/// Served for targets that end in `/`.
pub const INDEX_FILE: &str = "index.html";

const FORBIDDEN_HOST_CHARS: [char; 7] = ['/', '\\', '?', '#', '@', '%', '\0'];

/// Directory name for a `Host` header value.
///
/// The value must be a well-formed URL authority. The port is dropped and
/// the domain is used exactly as sent, so `Example.COM:8080` selects the
/// `Example.COM` directory.
pub fn virtual_host(host: &str) -> Result<String, ServerError> {
    let invalid = || ServerError::InvalidHost(host.to_string());

    if host.is_empty() || host.contains(FORBIDDEN_HOST_CHARS) {
        return Err(invalid());
    }

    let url = url::Url::parse(&format!("http://{host}/")).map_err(|_| invalid())?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }

    let domain = strip_port(host);
    if domain.is_empty() || domain == "." || domain == ".." {
        return Err(invalid());
    }

    Ok(domain.to_string())
}

/// `host` without a trailing `:<digits>`. Bracketed IPv6 literals keep
/// their inner colons.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }

    match host.rsplit_once(':') {
        Some((domain, port)) if port.bytes().all(|b| b.is_ascii_digit()) => domain,
        _ => host,
    }
}

/// The target relative to the host directory.
pub fn relative_target(file_path: &str) -> Result<PathBuf, ServerError> {
    let mut relative = PathBuf::new();

    for component in Path::new(file_path).components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(segment) => relative.push(segment),
            Component::ParentDir => {
                if !relative.pop() {
                    return Err(ServerError::Forbidden(file_path.to_string()));
                }
            }
            Component::Prefix(_) => return Err(ServerError::Forbidden(file_path.to_string())),
        }
    }

    if file_path.ends_with('/') {
        relative.push(INDEX_FILE);
    }

    Ok(relative)
}

/// Where a request lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// `root / host`, the directory the target must stay inside
    pub host_dir: PathBuf,
    /// `root / host / target`, with the index file for directory targets
    pub path: PathBuf,
}

/// Resolves `request` under `root`.
pub fn resolve(root: &Path, request: &Request) -> Result<Resolved, ServerError> {
    let host_dir = root.join(virtual_host(&request.host)?);
    let path = host_dir.join(relative_target(&request.file_path)?);

    Ok(Resolved { host_dir, path })
}

/// Any file name ending in `.html` gets a content type, `.html` itself
/// included.
pub fn is_html(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".html"))
}
