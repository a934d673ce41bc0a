//! Game backend API.
//!
//! The client never interprets commands itself. Everything goes through the
//! [`GameBackend`] seam:
//!
//! - **types**: request/response bodies as they travel over the wire
//! - **http**: `reqwest` implementation against the real backend
//! - **error**: [`ApiError`], converted to transcript entries by the caller
//!
//! # Endpoints
//!
//! | Operation | Method & path |
//! |-----------|---------------|
//! | Start session | `POST /api/game/new` |
//! | Submit command | `POST /api/game/{session_id}/command` |
//! | Discard session | `DELETE /api/game/{session_id}` |

pub mod error;
pub mod http;
pub mod types;

use async_trait::async_trait;

pub use error::ApiError;
pub use http::HttpBackend;
pub use types::*;

/// Backend the session client talks to
#[async_trait]
pub trait GameBackend: Send + Sync {
    /// Create a new game session
    async fn new_game(&self, request: &NewGameRequest) -> error::Result<NewGameResponse>;

    /// Send one raw command line to an existing session
    async fn send_command(
        &self,
        session_id: &SessionId,
        request: &CommandRequest,
    ) -> error::Result<CommandResponse>;

    /// Permanently remove a session on the backend
    async fn delete_session(&self, session_id: &SessionId) -> error::Result<()>;
}

/// Resolve an `image_url` from the backend to an absolute locator.
///
/// Relative paths are appended to the configured base address. Absolute
/// `http(s)` URLs pass through untouched.
pub fn resolve_image_url(base_url: &str, image_url: &str) -> String {
    let image_url = image_url.trim();
    if image_url.starts_with("http://") || image_url.starts_with("https://") {
        return image_url.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if image_url.starts_with('/') {
        format!("{}{}", base, image_url)
    } else {
        format!("{}/{}", base, image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(
            resolve_image_url("http://localhost:8000", "/images/foo.png"),
            "http://localhost:8000/images/foo.png"
        );
    }

    #[test]
    fn test_resolve_does_not_double_slash() {
        assert_eq!(
            resolve_image_url("http://localhost:8000/", "/images/foo.png"),
            "http://localhost:8000/images/foo.png"
        );
        assert_eq!(
            resolve_image_url("http://localhost:8000", "images/foo.png"),
            "http://localhost:8000/images/foo.png"
        );
    }

    #[test]
    fn test_resolve_keeps_absolute_url() {
        assert_eq!(
            resolve_image_url("http://localhost:8000", "https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }
}
