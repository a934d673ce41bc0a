//! Wire types for the game backend HTTP API
//!
//! Response types are lenient: only the fields the client cannot work
//! without are required, everything else falls back to a default.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque session identifier issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    #[cfg(test)]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `POST /api/game/new` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGameRequest {
    pub adventure_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

/// `POST /api/game/new` response body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewGameResponse {
    pub session_id: SessionId,
    #[serde(default)]
    pub current_location_id: Option<String>,
    #[serde(default)]
    pub inventory: Vec<String>,
    #[serde(default)]
    pub visited_locations: Vec<String>,
    pub message: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// `POST /api/game/{session_id}/command` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRequest {
    pub command: String,
}

/// Game state snapshot nested in a command response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub current_location_id: Option<String>,
    pub inventory: Vec<String>,
    pub visited_locations: Vec<String>,
    pub image_url: Option<String>,
}

/// `POST /api/game/{session_id}/command` response body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub state: GameState,
}

fn default_success() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_minimal_body() {
        let body = r#"{"session_id":"abc","message":"You are in a dark room."}"#;
        let resp: NewGameResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.session_id.as_str(), "abc");
        assert_eq!(resp.message, "You are in a dark room.");
        assert!(resp.image_url.is_none());
        assert!(resp.inventory.is_empty());
    }

    #[test]
    fn test_new_game_full_body() {
        let body = r#"{
            "session_id": "7f3c",
            "current_location_id": "church",
            "inventory": [],
            "visited_locations": ["church"],
            "message": "St. Margaret's Church\n\nYou stand in the dimly lit nave.",
            "image_url": "/images/church.png"
        }"#;
        let resp: NewGameResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.current_location_id.as_deref(), Some("church"));
        assert_eq!(resp.visited_locations, vec!["church".to_string()]);
        assert_eq!(resp.image_url.as_deref(), Some("/images/church.png"));
    }

    #[test]
    fn test_new_game_requires_session_id() {
        let body = r#"{"message":"hello"}"#;
        assert!(serde_json::from_str::<NewGameResponse>(body).is_err());
    }

    #[test]
    fn test_command_response_defaults() {
        let resp: CommandResponse = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.state, GameState::default());

        let body = r#"{
            "success": false,
            "message": "You can't go that way.",
            "state": {"session_id": "abc", "current_location_id": "crypt",
                      "inventory": ["candle"], "visited_locations": [],
                      "message": "ignored", "image_url": "/images/crypt.png"}
        }"#;
        let resp: CommandResponse = serde_json::from_str(body).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.state.inventory, vec!["candle".to_string()]);
        assert_eq!(resp.state.image_url.as_deref(), Some("/images/crypt.png"));
    }

    #[test]
    fn test_new_game_request_omits_missing_player() {
        let req = NewGameRequest {
            adventure_id: "halloween_2025".to_string(),
            player_name: None,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"adventure_id":"halloween_2025"}"#
        );
    }
}
