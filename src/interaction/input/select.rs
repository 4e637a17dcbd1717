use bevy::prelude::*;

use crate::core::system::system_order::{PlacementSet, SessionSet};
use crate::interaction::session::lifecycle::SessionCommand;

/// Primary user action. Consumed by the placer; nothing else listens.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectEvent {
    pub origin: SelectOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOrigin {
    /// Runtime input source (controller / screen tap inside the session).
    Controller,
    Mouse,
    Touch,
    Keyboard,
}

pub struct SelectInputPlugin;

impl Plugin for SelectInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SelectEvent>()
            .add_systems(Update, desktop_select_input.before(PlacementSet))
            .add_systems(Update, session_toggle_key.before(SessionSet));
    }
}

/// Desktop stand-ins for the runtime's select: left click, a new touch, or Space.
/// Input resources are absent in headless apps; the system then does nothing.
fn desktop_select_input(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    touches: Option<Res<Touches>>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut selects: EventWriter<SelectEvent>,
) {
    if buttons.is_some_and(|b| b.just_pressed(MouseButton::Left)) {
        selects.write(SelectEvent { origin: SelectOrigin::Mouse });
    }
    if touches.is_some_and(|t| t.any_just_pressed()) {
        selects.write(SelectEvent { origin: SelectOrigin::Touch });
    }
    if keys.is_some_and(|k| k.just_pressed(KeyCode::Space)) {
        selects.write(SelectEvent { origin: SelectOrigin::Keyboard });
    }
}

/// Enter toggles the session, standing in for the AR entry button.
fn session_toggle_key(keys: Option<Res<ButtonInput<KeyCode>>>, mut commands: EventWriter<SessionCommand>) {
    if keys.is_some_and(|k| k.just_pressed(KeyCode::Enter)) {
        commands.write(SessionCommand::Toggle);
    }
}
