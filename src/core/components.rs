use bevy::prelude::*;

use crate::xr::SessionId;

/// Marker for the ring that shows where the next placement lands.
#[derive(Component)]
pub struct Reticle;

/// A placed copy of the template. `serial` increases with each placement.
#[derive(Component, Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlacedObject {
    pub serial: u64,
    /// Session that was active when the object was placed.
    pub session: Option<SessionId>,
}

/// Camera driven by the viewer pose.
#[derive(Component)]
pub struct ArCamera;

/// Entity standing for a live session; its end observer is attached here.
#[derive(Component, Debug, Copy, Clone)]
pub struct ArSessionEntity {
    pub id: SessionId,
}
