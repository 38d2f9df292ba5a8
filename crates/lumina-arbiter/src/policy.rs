//! The closed policy table keyed on command actions.
//!
//! Actions arrive as free strings on the wire but are dispatched as a
//! closed [`Action`] enum, with a fallback [`Action::Unknown`] case that
//! the reducer turns into a `rejected` event. Three legacy families
//! match by prefix (`add_todo*`, `set_mode*`, `gesture_*`), everything
//! else matches exactly.

use serde_json::Value;

use lumina_types::Command;

/// A recognised policy-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `add_todo*` -- append a todo item.
    AddTodo,
    /// `toggle_mic` -- flip microphone capture.
    ToggleMic,
    /// `toggle_cam` -- flip camera capture.
    ToggleCam,
    /// `set_mode*` -- assign the legacy interaction mode.
    SetMode,
    /// `gesture_*` -- record the last recognised gesture.
    Gesture,
    /// `set_gn_armed` -- arm or disarm the global-navigation modifier.
    SetGnArmed,
    /// `nav.nextApp` -- rotate forward through the visible apps.
    NavNextApp,
    /// `nav.prevApp` -- rotate backward through the visible apps.
    NavPrevApp,
    /// `nav.openAppFocused` -- clear the focus path into the current app.
    NavOpenAppFocused,
    /// `nav.backOrHome` -- route back to home unless already there.
    NavBackOrHome,
    /// `app.navigate` -- in-app navigation, resolved by the frontend.
    AppNavigate,
    /// `app.selectFocus` -- in-app focus selection, resolved by the frontend.
    AppSelectFocus,
    /// `app.quickActions` -- in-app quick actions, resolved by the frontend.
    AppQuickActions,
    /// `voice.openApp` -- route directly to a named app.
    VoiceOpenApp,
    /// `voice.nav` -- canonicalised into a `nav.*` command before reduction.
    VoiceNav,
    /// `system.toggleDebug` -- flip the debug overlay.
    SystemToggleDebug,
    /// `system.setMode` -- change the privacy mode (code-gated for private).
    SystemSetMode,
    /// No policy match; the reducer rejects it.
    Unknown,
}

impl Action {
    /// Look an action string up in the policy table.
    pub fn parse(action: &str) -> Self {
        match action {
            "toggle_mic" => Self::ToggleMic,
            "toggle_cam" => Self::ToggleCam,
            "set_gn_armed" => Self::SetGnArmed,
            "nav.nextApp" => Self::NavNextApp,
            "nav.prevApp" => Self::NavPrevApp,
            "nav.openAppFocused" => Self::NavOpenAppFocused,
            "nav.backOrHome" => Self::NavBackOrHome,
            "app.navigate" => Self::AppNavigate,
            "app.selectFocus" => Self::AppSelectFocus,
            "app.quickActions" => Self::AppQuickActions,
            "voice.openApp" => Self::VoiceOpenApp,
            "voice.nav" => Self::VoiceNav,
            "system.toggleDebug" => Self::SystemToggleDebug,
            "system.setMode" => Self::SystemSetMode,
            other if other.starts_with("add_todo") => Self::AddTodo,
            other if other.starts_with("set_mode") => Self::SetMode,
            other if other.starts_with("gesture_") => Self::Gesture,
            _ => Self::Unknown,
        }
    }
}

/// Translate a `voice.nav` command into its canonical navigation command.
///
/// Happens at the reducer boundary, preserving the command's identity and
/// timestamp, so the reducer itself never re-dispatches. Unrecognised
/// voice payloads pass through unchanged and are rejected as unknown.
pub fn canonicalize(cmd: Command) -> Command {
    if cmd.action != "voice.nav" {
        return cmd;
    }
    let target = match cmd.payload.get("action").and_then(Value::as_str) {
        Some("next") => Some("nav.nextApp"),
        Some("prev" | "previous") => Some("nav.prevApp"),
        Some("back") => Some("nav.backOrHome"),
        Some("select") => Some("app.selectFocus"),
        _ => None,
    };
    match target {
        Some(action) => Command {
            action: action.to_owned(),
            payload: std::collections::BTreeMap::new(),
            ..cmd
        },
        None => cmd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_types::Source;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn voice_nav(nav_action: &str) -> Command {
        let mut payload = BTreeMap::new();
        payload.insert(String::from("action"), json!(nav_action));
        Command::new(Source::Voice, "voice.nav", payload)
    }

    #[test]
    fn exact_actions_parse() {
        assert_eq!(Action::parse("toggle_mic"), Action::ToggleMic);
        assert_eq!(Action::parse("nav.backOrHome"), Action::NavBackOrHome);
        assert_eq!(Action::parse("system.setMode"), Action::SystemSetMode);
    }

    #[test]
    fn prefix_families_parse() {
        assert_eq!(Action::parse("add_todo"), Action::AddTodo);
        assert_eq!(Action::parse("add_todo_from_voice"), Action::AddTodo);
        assert_eq!(Action::parse("set_mode"), Action::SetMode);
        assert_eq!(Action::parse("set_mode_voice"), Action::SetMode);
        assert_eq!(Action::parse("gesture_palm"), Action::Gesture);
        assert_eq!(Action::parse("gesture_swipe_left"), Action::Gesture);
    }

    #[test]
    fn unmatched_actions_are_unknown() {
        assert_eq!(Action::parse("warp_drive"), Action::Unknown);
        assert_eq!(Action::parse("gesture"), Action::Unknown);
        assert_eq!(Action::parse(""), Action::Unknown);
    }

    #[test]
    fn voice_nav_canonicalises_preserving_identity() {
        let cmd = voice_nav("next");
        let id = cmd.id;
        let ts = cmd.ts;
        let canonical = canonicalize(cmd);
        assert_eq!(canonical.action, "nav.nextApp");
        assert_eq!(canonical.id, id);
        assert_eq!(canonical.ts, ts);
        assert!(canonical.payload.is_empty());
    }

    #[test]
    fn voice_nav_synonyms() {
        assert_eq!(canonicalize(voice_nav("prev")).action, "nav.prevApp");
        assert_eq!(canonicalize(voice_nav("previous")).action, "nav.prevApp");
        assert_eq!(canonicalize(voice_nav("back")).action, "nav.backOrHome");
        assert_eq!(canonicalize(voice_nav("select")).action, "app.selectFocus");
    }

    #[test]
    fn unrecognised_voice_nav_passes_through() {
        let cmd = voice_nav("sideways");
        assert_eq!(canonicalize(cmd).action, "voice.nav");
    }

    #[test]
    fn other_actions_pass_through_untouched() {
        let cmd = Command::new(Source::Gesture, "toggle_cam", BTreeMap::new());
        assert_eq!(canonicalize(cmd).action, "toggle_cam");
    }
}
