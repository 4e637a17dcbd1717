//! Central system ordering labels to make the tick sequence explicit.
//! Stages (high-level):
//! 1. XrPumpSet (PreUpdate: runtime events, then this tick's tracking context)
//! 2. SessionSet (capability, start/stop commands, pending session request)
//! 3. FrameLoopSet (hit-test channel + reticle snapshot)
//! 4. PlacementSet (select -> placed objects)
//! 5. PresentationSet (reticle visual, camera pose)
//! 6. Rendering (implicit, every tick)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct XrPumpSet; // PreUpdate

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct SessionSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct FrameLoopSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PlacementSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PresentationSet; // mirrors state onto visible entities
