use bevy::prelude::*;

/// AR session lifecycle as seen by the app.
/// Checking -> Unsupported | Idle -> Starting -> Active -> Idle
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum ArSessionState {
    /// Capability query in flight.
    #[default]
    Checking,
    /// Required features unavailable (or the runtime could not answer). Terminal.
    Unsupported,
    /// Supported, no session. Start is accepted.
    Idle,
    /// Session requested, not yet granted.
    Starting,
    Active,
}
