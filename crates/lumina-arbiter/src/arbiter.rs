//! The command arbiter: policy-driven reduction of commands into events
//! and state patches.
//!
//! `handle()` is the single write path of the whole control plane. The
//! state write guard spans only policy evaluation and patch application,
//! so concurrent submissions serialize on the tree without ever waiting
//! on disk or broker I/O behind the lock. Each arbitration takes an
//! application sequence number while the guard is held; the event log is
//! ordered by that number, so replaying it reproduces the apply order
//! even when persistence itself races. Downstream failures (store,
//! broker) are logged and swallowed: the mirror keeps responding even
//! when persistence or fan-out is degraded.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::{Value, json};
use tracing::{debug, warn};

use lumina_bus::PatchPublisher;
use lumina_db::{DbError, EventStore, SqliteDb};
use lumina_state::{StateHandle, engine};
use lumina_types::{
    AppRoute, Command, Event, PrivacyMode, StatePatch, TodoItem, UiState, next_app, prev_app,
};

use crate::policy::{Action, canonicalize};

/// The outcome of reducing one command: zero or more patches (applied
/// and published in order) and exactly one event.
struct Outcome {
    patches: Vec<StatePatch>,
    event: Event,
}

impl Outcome {
    /// A single-patch outcome whose event carries the patch.
    fn patch(cmd: &Command, patch: StatePatch) -> Self {
        let event = Event::state_patch(cmd, &patch);
        Self {
            patches: vec![patch],
            event,
        }
    }

    /// A patch-free acknowledgement.
    fn accepted(cmd: &Command, payload: Value) -> Self {
        Self {
            patches: Vec::new(),
            event: Event::accepted(cmd, payload),
        }
    }

    /// A patch-free refusal.
    fn rejected(cmd: &Command, reason: &str) -> Self {
        Self {
            patches: Vec::new(),
            event: Event::rejected(cmd, reason),
        }
    }
}

/// The policy reducer and single owner of all state mutation.
pub struct Arbiter {
    state: StateHandle,
    db: SqliteDb,
    publisher: Arc<dyn PatchPublisher>,
    private_code: String,
    /// Next application sequence number; drawn while the state write
    /// guard is held, so sequence order equals apply order.
    next_seq: AtomicI64,
}

impl Arbiter {
    /// Assemble an arbiter over its collaborators.
    ///
    /// Continues the application sequence from the highest number
    /// already in the event log.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the log position cannot be read.
    pub async fn new(
        state: StateHandle,
        db: SqliteDb,
        publisher: Arc<dyn PatchPublisher>,
        private_code: &str,
    ) -> Result<Self, DbError> {
        let max_seq = EventStore::new(db.pool()).max_seq().await?;
        Ok(Self {
            state,
            db,
            publisher,
            private_code: private_code.to_owned(),
            next_seq: AtomicI64::new(max_seq.saturating_add(1)),
        })
    }

    /// The state handle this arbiter mutates.
    pub const fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Arbitrate one command into an event.
    ///
    /// Ordering within one call: state is mutated first, the event is
    /// appended second, patches are published last (FIFO). The write
    /// guard is released before the append and the publish, so a slow
    /// disk or an unreachable broker never blocks other commands out of
    /// the tree; the sequence number drawn under the guard keeps the log
    /// in apply order regardless. Store and broker failures are logged
    /// but never surfaced to the producer.
    pub async fn handle(&self, cmd: Command) -> Event {
        let cmd = canonicalize(cmd);
        let action = Action::parse(&cmd.action);
        debug!(
            action = cmd.action,
            source = cmd.source.as_str(),
            "arbitrating command"
        );

        let mut tree = self.state.write().await;
        let outcome = self.reduce(action, &cmd, &tree);

        for patch in &outcome.patches {
            engine::apply(&mut tree, &patch.path, &patch.value);
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        drop(tree);

        if let Err(e) = EventStore::new(self.db.pool())
            .append(seq, &outcome.event)
            .await
        {
            warn!(error = %e, "failed to persist event, continuing degraded");
        }

        for patch in &outcome.patches {
            self.publisher.publish(patch).await;
        }

        outcome.event
    }

    /// Evaluate the policy table against the current tree.
    fn reduce(&self, action: Action, cmd: &Command, tree: &UiState) -> Outcome {
        match action {
            Action::AddTodo => add_todo(cmd, tree),
            Action::ToggleMic => {
                Outcome::patch(cmd, patch(cmd, "/mic_enabled", json!(!tree.mic_enabled)))
            }
            Action::ToggleCam => {
                Outcome::patch(cmd, patch(cmd, "/cam_enabled", json!(!tree.cam_enabled)))
            }
            Action::SetMode => {
                let mode = cmd.payload_str("mode").unwrap_or("idle");
                Outcome::patch(cmd, patch(cmd, "/mode", json!(mode)))
            }
            Action::Gesture => {
                let gesture = cmd.payload_str("gesture").unwrap_or("idle");
                Outcome::patch(cmd, patch(cmd, "/last_gesture", json!(gesture)))
            }
            Action::SetGnArmed => {
                let armed = cmd.payload_bool("gnArmed").unwrap_or(false);
                Outcome::patch(cmd, patch(cmd, "/ui/gnArmed", json!(armed)))
            }
            Action::NavNextApp => {
                let app = next_app(tree.ui.app_route, tree.ui.mode);
                Outcome::patch(cmd, patch(cmd, "/ui/appRoute", json!(app.as_str())))
            }
            Action::NavPrevApp => {
                let app = prev_app(tree.ui.app_route, tree.ui.mode);
                Outcome::patch(cmd, patch(cmd, "/ui/appRoute", json!(app.as_str())))
            }
            Action::NavOpenAppFocused => {
                Outcome::patch(cmd, patch(cmd, "/ui/focusPath", json!([])))
            }
            Action::NavBackOrHome => {
                if tree.ui.app_route == AppRoute::Home {
                    Outcome::accepted(cmd, json!({ "action": cmd.action, "noop": true }))
                } else {
                    Outcome::patch(cmd, patch(cmd, "/ui/appRoute", json!("home")))
                }
            }
            Action::AppNavigate => {
                let direction = cmd.payload_str("direction").unwrap_or("next");
                Outcome::accepted(cmd, json!({ "action": cmd.action, "direction": direction }))
            }
            Action::AppSelectFocus | Action::AppQuickActions => {
                Outcome::accepted(cmd, json!({ "action": cmd.action }))
            }
            Action::VoiceOpenApp => open_app(cmd, tree),
            Action::SystemToggleDebug => Outcome::patch(
                cmd,
                patch(cmd, "/ui/debug/enabled", json!(!tree.ui.debug.enabled)),
            ),
            Action::SystemSetMode => self.set_privacy_mode(cmd, tree),
            Action::VoiceNav | Action::Unknown => Outcome::rejected(cmd, "unknown_action"),
        }
    }

    /// `system.setMode`: code-gated entry to private mode; leaving private
    /// mode while a private app is routed emits the home patch first.
    fn set_privacy_mode(&self, cmd: &Command, tree: &UiState) -> Outcome {
        let requested = cmd.payload_str("mode");

        if requested == Some(PrivacyMode::Private.as_str())
            && cmd.payload_str("code") != Some(self.private_code.as_str())
        {
            return Outcome::rejected(cmd, "invalid_code");
        }

        let mode_value = cmd.payload.get("mode").cloned().unwrap_or(Value::Null);
        let mode_patch = patch(cmd, "/ui/mode", mode_value);

        let exposes_private_app = tree.ui.mode == PrivacyMode::Private
            && requested == Some(PrivacyMode::Public.as_str())
            && !tree.ui.app_route.is_visible(PrivacyMode::Public);

        if exposes_private_app {
            // Route to home first so no frame ever shows a private app in
            // public mode; the event carries the mode patch.
            let home = patch(cmd, "/ui/appRoute", json!("home"));
            let event = Event::state_patch(cmd, &mode_patch);
            Outcome {
                patches: vec![home, mode_patch],
                event,
            }
        } else {
            Outcome::patch(cmd, mode_patch)
        }
    }
}

impl std::fmt::Debug for Arbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbiter").finish_non_exhaustive()
    }
}

/// Shorthand for a patch stamped with the command's timestamp.
fn patch(cmd: &Command, path: &str, value: Value) -> StatePatch {
    StatePatch::new(cmd.ts, path, value)
}

/// `add_todo*`: append a todo whose id continues the list.
fn add_todo(cmd: &Command, tree: &UiState) -> Outcome {
    let next_id = u64::try_from(tree.todos.len())
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let item = TodoItem {
        id: next_id,
        text: cmd.payload_str("text").unwrap_or("").to_owned(),
        completed: false,
        created_at: cmd.ts,
    };
    let value = serde_json::to_value(&item).unwrap_or(Value::Null);
    Outcome::patch(cmd, patch(cmd, "/todos/+", value))
}

/// `voice.openApp`: route to a named app if it is visible right now.
fn open_app(cmd: &Command, tree: &UiState) -> Outcome {
    match cmd.payload_str("app").and_then(AppRoute::parse) {
        Some(app) if app.is_visible(tree.ui.mode) => {
            Outcome::patch(cmd, patch(cmd, "/ui/appRoute", json!(app.as_str())))
        }
        _ => Outcome::rejected(cmd, "app_not_visible"),
    }
}
