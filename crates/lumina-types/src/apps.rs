//! The canonical app registry and privacy-mode visibility rules.
//!
//! The registry is the single source of truth consumed by both the
//! visibility filter and the circular next/prev rotation, so the arbiter
//! and the frontend can never disagree about ordering.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An app the mirror can route to.
///
/// The variant order is incidental; canonical ordering lives in
/// [`APP_REGISTRY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum AppRoute {
    /// The default dashboard.
    Home,
    /// Weather panel.
    Weather,
    /// Email inbox (private only).
    Email,
    /// Finance overview (private only).
    Finance,
    /// News headlines.
    News,
    /// Todo list.
    Todos,
    /// Calendar agenda.
    Calendar,
    /// Mirror settings.
    Settings,
}

/// Privacy mode of the mirror UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum PrivacyMode {
    /// Anyone may be in front of the mirror; private apps are hidden.
    Public,
    /// Unlocked with the private-mode code; all apps visible.
    Private,
}

/// Canonical, ordered app registry (matches the frontend).
pub const APP_REGISTRY: [AppRoute; 8] = [
    AppRoute::Home,
    AppRoute::Weather,
    AppRoute::Email,
    AppRoute::Finance,
    AppRoute::News,
    AppRoute::Todos,
    AppRoute::Calendar,
    AppRoute::Settings,
];

impl AppRoute {
    /// Wire name of the route (matches the serde representation).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Weather => "weather",
            Self::Email => "email",
            Self::Finance => "finance",
            Self::News => "news",
            Self::Todos => "todos",
            Self::Calendar => "calendar",
            Self::Settings => "settings",
        }
    }

    /// Parse a wire name back into a route.
    ///
    /// Returns `None` for anything outside the registry.
    pub fn parse(value: &str) -> Option<Self> {
        APP_REGISTRY.iter().copied().find(|app| app.as_str() == value)
    }

    /// Whether this app may be shown in the given privacy mode.
    pub const fn is_visible(self, mode: PrivacyMode) -> bool {
        match mode {
            PrivacyMode::Private => true,
            PrivacyMode::Public => !matches!(self, Self::Email | Self::Finance),
        }
    }
}

impl PrivacyMode {
    /// Wire name of the mode (matches the serde representation).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Parse a wire name back into a mode.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// The registry filtered down to apps visible in `mode`, in canonical order.
pub fn visible_apps(mode: PrivacyMode) -> Vec<AppRoute> {
    APP_REGISTRY
        .iter()
        .copied()
        .filter(|app| app.is_visible(mode))
        .collect()
}

/// The app after `current` in the visible rotation (circular).
///
/// If `current` is not visible in `mode`, the first visible app is
/// returned; an empty visible set falls back to [`AppRoute::Home`].
pub fn next_app(current: AppRoute, mode: PrivacyMode) -> AppRoute {
    let visible = visible_apps(mode);
    visible.iter().position(|app| *app == current).map_or_else(
        || visible.first().copied().unwrap_or(AppRoute::Home),
        |idx| {
            let next = idx
                .wrapping_add(1)
                .checked_rem(visible.len())
                .unwrap_or(0);
            visible.get(next).copied().unwrap_or(AppRoute::Home)
        },
    )
}

/// The app before `current` in the visible rotation (circular).
///
/// If `current` is not visible in `mode`, the last visible app is
/// returned; an empty visible set falls back to [`AppRoute::Home`].
pub fn prev_app(current: AppRoute, mode: PrivacyMode) -> AppRoute {
    let visible = visible_apps(mode);
    visible.iter().position(|app| *app == current).map_or_else(
        || visible.last().copied().unwrap_or(AppRoute::Home),
        |idx| {
            let prev = idx
                .checked_sub(1)
                .unwrap_or_else(|| visible.len().saturating_sub(1));
            visible.get(prev).copied().unwrap_or(AppRoute::Home)
        },
    )
}
