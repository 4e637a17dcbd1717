// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use super::pending::Pending;
use super::types::{
    FeatureSet, HitTestSource, ReferenceSpace, ReferenceSpaceKind, SessionInit, SessionMode, XrEvent,
    XrFrame, XrSession,
};

/// Host AR runtime. Every request is asynchronous: the returned [`Pending`] may
/// settle on any later tick. Implementations never block.
pub trait XrRuntime: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Whether `mode` sessions with `required` features can be created.
    fn is_session_supported(&mut self, mode: SessionMode, required: &FeatureSet) -> Pending<bool>;

    fn request_session(&mut self, init: &SessionInit) -> Pending<XrSession>;

    fn request_reference_space(
        &mut self,
        session: &XrSession,
        kind: ReferenceSpaceKind,
    ) -> Pending<ReferenceSpace>;

    fn request_hit_test_source(
        &mut self,
        session: &XrSession,
        space: &ReferenceSpace,
    ) -> Pending<HitTestSource>;

    /// Ask the runtime to end `session`. Completion is reported through
    /// [`XrEvent::SessionEnded`] from [`drain_events`](Self::drain_events).
    fn end_session(&mut self, session: &XrSession);

    /// Called once per host tick. Returns the tracking context for `session`
    /// when it is actively tracking this tick.
    fn begin_frame(&mut self, session: Option<&XrSession>, time: f64) -> Option<XrFrame>;

    fn drain_events(&mut self) -> Vec<XrEvent>;
}

/// The runtime the app talks to.
#[derive(Resource, Deref, DerefMut)]
pub struct XrRuntimeRes(pub Box<dyn XrRuntime>);

impl XrRuntimeRes {
    pub fn new(runtime: impl XrRuntime) -> Self {
        Self(Box::new(runtime))
    }
}

/// Tracking context for the current tick, refreshed in `PreUpdate`.
#[derive(Resource, Default, Debug)]
pub struct CurrentXrFrame(pub Option<XrFrame>);
