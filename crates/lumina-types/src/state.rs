//! The authoritative UI state tree.
//!
//! Exactly one [`UiState`] instance exists per running arbiter process.
//! All mutation goes through the patch engine in `lumina-state`; these
//! types are the pure data shape shared with the TypeScript frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::apps::{AppRoute, PrivacyMode};

/// One entry in the todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TodoItem {
    /// Position-derived identifier, unique within the list.
    pub id: u64,
    /// Todo text.
    pub text: String,
    /// Whether the item has been completed.
    pub completed: bool,
    /// Timestamp of the command that created the item.
    pub created_at: DateTime<Utc>,
}

/// Heads-up-display indicator flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct HudState {
    /// Microphone capture indicator.
    pub mic_on: bool,
    /// Camera capture indicator.
    pub cam_on: bool,
    /// Whether the frontend's state socket is connected.
    pub ws_connected: bool,
    /// Wake-word acknowledgement flash.
    pub wake: bool,
}

/// Debug overlay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DebugState {
    /// Whether the debug overlay is shown.
    pub enabled: bool,
}

/// The `ui` subtree: routing, focus, and privacy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct UiShell {
    /// Current privacy mode.
    pub mode: PrivacyMode,
    /// The app currently routed to; always visible in `mode`.
    pub app_route: AppRoute,
    /// Focus path segments within the current app.
    pub focus_path: Vec<String>,
    /// Whether the global-navigation gesture modifier is armed.
    pub gn_armed: bool,
    /// Debug overlay.
    pub debug: DebugState,
    /// HUD indicator flags.
    pub hud: HudState,
}

impl Default for UiShell {
    fn default() -> Self {
        Self {
            mode: PrivacyMode::Public,
            app_route: AppRoute::Home,
            focus_path: Vec::new(),
            gn_armed: false,
            debug: DebugState::default(),
            hud: HudState::default(),
        }
    }
}

/// The complete authoritative state tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UiState {
    /// Legacy interaction mode (`idle`, `voice`, `gesture`, `settings`).
    pub mode: String,
    /// Ordered todo list.
    pub todos: Vec<TodoItem>,
    /// Whether the microphone is enabled.
    pub mic_enabled: bool,
    /// Whether the camera is enabled.
    pub cam_enabled: bool,
    /// Most recently recognised gesture.
    pub last_gesture: String,
    /// Bumped on every successful patch.
    pub last_updated: DateTime<Utc>,
    /// Routing, focus, and privacy subtree.
    pub ui: UiShell,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: String::from("idle"),
            todos: Vec::new(),
            mic_enabled: false,
            cam_enabled: false,
            last_gesture: String::from("idle"),
            last_updated: Utc::now(),
            ui: UiShell::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let state = UiState::default();
        assert_eq!(state.mode, "idle");
        assert!(state.todos.is_empty());
        assert!(!state.mic_enabled);
        assert!(!state.cam_enabled);
        assert_eq!(state.last_gesture, "idle");
        assert_eq!(state.ui.mode, PrivacyMode::Public);
        assert_eq!(state.ui.app_route, AppRoute::Home);
        assert!(state.ui.focus_path.is_empty());
        assert!(!state.ui.gn_armed);
        assert!(!state.ui.debug.enabled);
        assert!(!state.ui.hud.wake);
    }

    #[test]
    fn wire_field_names_are_camel_case_under_ui() {
        let state = UiState::default();
        let value = serde_json::to_value(&state).unwrap_or_default();
        assert_eq!(value["ui"]["appRoute"], "home");
        assert_eq!(value["ui"]["mode"], "public");
        assert_eq!(value["ui"]["gnArmed"], false);
        assert_eq!(value["ui"]["debug"]["enabled"], false);
        assert_eq!(value["ui"]["hud"]["micOn"], false);
        assert_eq!(value["ui"]["hud"]["wsConnected"], false);
        assert_eq!(value["mic_enabled"], false);
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut state = UiState::default();
        state.todos.push(TodoItem {
            id: 1,
            text: String::from("Buy milk"),
            completed: false,
            created_at: Utc::now(),
        });
        state.ui.mode = PrivacyMode::Private;
        state.ui.app_route = AppRoute::Email;

        let json = serde_json::to_string(&state).unwrap_or_default();
        let restored: Result<UiState, _> = serde_json::from_str(&json);
        assert!(restored.is_ok());
        if let Ok(restored) = restored {
            assert_eq!(restored, state);
        }
    }
}
