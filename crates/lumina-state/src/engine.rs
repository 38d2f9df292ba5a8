//! The JSON-path patch engine.
//!
//! Paths are `/`-separated segments into the [`UiState`] tree. The engine
//! is deliberately forgiving: unknown or malformed paths, out-of-range
//! indices, and type-mismatched values are silent no-ops -- a bad patch
//! must never crash the arbiter. Every successful assignment bumps
//! `last_updated`.
//!
//! Recognised forms:
//!
//! | Path | Semantics |
//! |------|-----------|
//! | `/<field>` | Assign a top-level field |
//! | `/todos/+` | Append a todo item |
//! | `/todos/<index>` | Replace the todo at an integer index |
//! | `/ui/mode` | Assign the privacy mode |
//! | `/ui/appRoute` | Assign the routed app |
//! | `/ui/focusPath` | Assign the focus path (non-list values become empty) |
//! | `/ui/gnArmed` | Assign the GN-armed flag |
//! | `/ui/debug/enabled` | Assign the debug overlay flag |
//! | `/ui/hud/<key>` | Assign a HUD flag; unknown keys ignored |

use chrono::Utc;
use serde_json::Value;

use lumina_types::{AppRoute, PrivacyMode, TodoItem, UiShell, UiState};

/// Apply one patch to the state tree.
///
/// Returns `true` if the assignment took effect (and `last_updated` was
/// bumped), `false` if the patch was a no-op.
pub fn apply(state: &mut UiState, path: &str, value: &Value) -> bool {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return false;
    }
    let parts: Vec<&str> = trimmed.split('/').collect();

    let applied = match parts.as_slice() {
        ["ui", rest @ ..] => apply_ui(&mut state.ui, rest, value),
        ["todos", "+"] => append_todo(state, value),
        ["todos", index] => replace_todo(state, index, value),
        [field] => apply_top_level(state, field, value),
        _ => false,
    };

    if applied {
        state.last_updated = Utc::now();
    }
    applied
}

/// Assign a top-level field of the tree.
fn apply_top_level(state: &mut UiState, field: &str, value: &Value) -> bool {
    match field {
        "mode" => assign_str(&mut state.mode, value),
        "mic_enabled" => assign_bool(&mut state.mic_enabled, value),
        "cam_enabled" => assign_bool(&mut state.cam_enabled, value),
        "last_gesture" => assign_str(&mut state.last_gesture, value),
        "todos" => match serde_json::from_value::<Vec<TodoItem>>(value.clone()) {
            Ok(todos) => {
                state.todos = todos;
                true
            }
            Err(_) => false,
        },
        _ => false,
    }
}

/// Assign within the `ui` subtree.
fn apply_ui(ui: &mut UiShell, parts: &[&str], value: &Value) -> bool {
    match parts {
        ["mode"] => {
            let Some(mode) = value.as_str().and_then(PrivacyMode::parse) else {
                return false;
            };
            ui.mode = mode;
            // The routed app must stay within the visible set for the new
            // mode; transitions that would expose a private app land on
            // home. Keeps replayed logs and the live tree in agreement.
            if !ui.app_route.is_visible(mode) {
                ui.app_route = AppRoute::Home;
            }
            true
        }
        ["appRoute"] => {
            let Some(app) = value.as_str().and_then(AppRoute::parse) else {
                return false;
            };
            ui.app_route = app;
            true
        }
        ["focusPath"] => {
            // Non-list values are treated as an empty focus path.
            ui.focus_path = value.as_array().map_or_else(Vec::new, |items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            });
            true
        }
        ["gnArmed"] => assign_bool(&mut ui.gn_armed, value),
        ["debug", "enabled"] => assign_bool(&mut ui.debug.enabled, value),
        ["hud", key] => apply_hud(ui, key, value),
        _ => false,
    }
}

/// Assign a HUD indicator flag; unknown keys are ignored.
fn apply_hud(ui: &mut UiShell, key: &str, value: &Value) -> bool {
    match key {
        "micOn" => assign_bool(&mut ui.hud.mic_on, value),
        "camOn" => assign_bool(&mut ui.hud.cam_on, value),
        "wsConnected" => assign_bool(&mut ui.hud.ws_connected, value),
        "wake" => assign_bool(&mut ui.hud.wake, value),
        _ => false,
    }
}

/// Append a todo item; non-conforming values are no-ops.
fn append_todo(state: &mut UiState, value: &Value) -> bool {
    match serde_json::from_value::<TodoItem>(value.clone()) {
        Ok(item) => {
            state.todos.push(item);
            true
        }
        Err(_) => false,
    }
}

/// Replace the todo at `index`; out-of-range indices and non-conforming
/// values are no-ops.
fn replace_todo(state: &mut UiState, index: &str, value: &Value) -> bool {
    let Ok(idx) = index.parse::<usize>() else {
        return false;
    };
    let Ok(item) = serde_json::from_value::<TodoItem>(value.clone()) else {
        return false;
    };
    match state.todos.get_mut(idx) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => false,
    }
}

fn assign_bool(slot: &mut bool, value: &Value) -> bool {
    match value.as_bool() {
        Some(flag) => {
            *slot = flag;
            true
        }
        None => false,
    }
}

fn assign_str(slot: &mut String, value: &Value) -> bool {
    match value.as_str() {
        Some(text) => {
            *slot = text.to_owned();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn todo_value(id: u64, text: &str) -> Value {
        json!({
            "id": id,
            "text": text,
            "completed": false,
            "created_at": "2026-08-01T10:00:00Z",
        })
    }

    #[test]
    fn assigns_top_level_fields() {
        let mut state = UiState::default();
        assert!(apply(&mut state, "/mode", &json!("voice")));
        assert_eq!(state.mode, "voice");
        assert!(apply(&mut state, "/mic_enabled", &json!(true)));
        assert!(state.mic_enabled);
        assert!(apply(&mut state, "/last_gesture", &json!("palm")));
        assert_eq!(state.last_gesture, "palm");
    }

    #[test]
    fn appends_todos_in_order() {
        let mut state = UiState::default();
        assert!(apply(&mut state, "/todos/+", &todo_value(1, "first")));
        assert!(apply(&mut state, "/todos/+", &todo_value(2, "second")));
        assert_eq!(state.todos.len(), 2);
        assert_eq!(state.todos.first().map(|t| t.id), Some(1));
        assert_eq!(state.todos.last().map(|t| t.text.clone()), Some(String::from("second")));
    }

    #[test]
    fn replaces_todo_in_range() {
        let mut state = UiState::default();
        assert!(apply(&mut state, "/todos/+", &todo_value(1, "first")));
        assert!(apply(&mut state, "/todos/0", &todo_value(1, "edited")));
        assert_eq!(state.todos.first().map(|t| t.text.clone()), Some(String::from("edited")));
    }

    #[test]
    fn out_of_range_index_is_a_noop() {
        let mut state = UiState::default();
        assert!(!apply(&mut state, "/todos/5", &todo_value(6, "ghost")));
        assert!(state.todos.is_empty());
    }

    #[test]
    fn malformed_paths_are_noops() {
        let mut state = UiState::default();
        let before = state.clone();
        assert!(!apply(&mut state, "", &json!(true)));
        assert!(!apply(&mut state, "/", &json!(true)));
        assert!(!apply(&mut state, "/no_such_field", &json!(1)));
        assert!(!apply(&mut state, "/ui/no_such_leaf", &json!(1)));
        assert!(!apply(&mut state, "/ui/hud/unknownKey", &json!(true)));
        assert!(!apply(&mut state, "/todos/not_a_number", &json!(1)));
        assert_eq!(state, before);
    }

    #[test]
    fn type_mismatches_are_noops() {
        let mut state = UiState::default();
        assert!(!apply(&mut state, "/mic_enabled", &json!("yes")));
        assert!(!apply(&mut state, "/ui/appRoute", &json!("warp_drive")));
        assert!(!apply(&mut state, "/todos/+", &json!("not a todo")));
        assert!(!state.mic_enabled);
    }

    #[test]
    fn focus_path_coerces_non_lists_to_empty() {
        let mut state = UiState::default();
        assert!(apply(&mut state, "/ui/focusPath", &json!(["a", "b"])));
        assert_eq!(state.ui.focus_path, vec!["a", "b"]);
        assert!(apply(&mut state, "/ui/focusPath", &json!("oops")));
        assert!(state.ui.focus_path.is_empty());
    }

    #[test]
    fn hud_keys_assign() {
        let mut state = UiState::default();
        assert!(apply(&mut state, "/ui/hud/micOn", &json!(true)));
        assert!(apply(&mut state, "/ui/hud/wake", &json!(true)));
        assert!(state.ui.hud.mic_on);
        assert!(state.ui.hud.wake);
    }

    #[test]
    fn successful_patch_bumps_last_updated() {
        let mut state = UiState::default();
        let before = state.last_updated;
        assert!(apply(&mut state, "/ui/gnArmed", &json!(true)));
        assert!(state.last_updated >= before);
    }

    #[test]
    fn failed_patch_leaves_last_updated_alone() {
        let mut state = UiState::default();
        let before = state.last_updated;
        assert!(!apply(&mut state, "/nowhere", &json!(true)));
        assert_eq!(state.last_updated, before);
    }

    #[test]
    fn mode_transition_forces_visible_route() {
        let mut state = UiState::default();
        assert!(apply(&mut state, "/ui/mode", &json!("private")));
        assert!(apply(&mut state, "/ui/appRoute", &json!("email")));
        assert_eq!(state.ui.app_route, AppRoute::Email);
        // Leaving private mode while on a private app lands on home.
        assert!(apply(&mut state, "/ui/mode", &json!("public")));
        assert_eq!(state.ui.app_route, AppRoute::Home);
    }
}
