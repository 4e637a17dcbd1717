// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-tick driver.
//!
//! PreUpdate drains runtime notifications (session end goes to the observer
//! on the session entity, select becomes a [`SelectEvent`]) and then fetches
//! this tick's tracking context. Update advances the hit-test channel and the
//! reticle, then reacts to select. Rendering is never gated on any of it.

use bevy::prelude::*;

use super::context::ArSessionContext;
use super::placer::{evict_excess_placements, sync_placer_config, ObjectPlacer};
use super::reticle::sync_reticle_visual;
use crate::core::config::AppConfig;
use crate::core::system::system_order::{FrameLoopSet, PlacementSet, PresentationSet, XrPumpSet};
use crate::interaction::input::select::{SelectEvent, SelectOrigin};
use crate::interaction::session::lifecycle::SessionEnd;
use crate::xr::{CurrentXrFrame, XrEvent, XrRuntimeRes};

pub struct FrameLoopPlugin;

impl Plugin for FrameLoopPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>();
        let placer = ObjectPlacer::from_config(&app.world().resource::<AppConfig>().placement);
        app.insert_resource(placer)
            .init_resource::<ArSessionContext>()
            .init_resource::<CurrentXrFrame>()
            .add_event::<SelectEvent>()
            .add_systems(
                PreUpdate,
                (pump_runtime_events, begin_xr_frame).chain().in_set(XrPumpSet),
            )
            .add_systems(Update, advance_frame_loop.in_set(FrameLoopSet))
            .add_systems(
                Update,
                (sync_placer_config, place_on_select, evict_excess_placements)
                    .chain()
                    .in_set(PlacementSet),
            )
            .add_systems(Update, sync_reticle_visual.in_set(PresentationSet));
    }
}

/// Forward runtime notifications. A session end is delivered to the observer
/// registered on that session's entity; ends for unknown sessions are dropped.
pub fn pump_runtime_events(
    mut commands: Commands,
    mut runtime: ResMut<XrRuntimeRes>,
    ctx: Res<ArSessionContext>,
    mut selects: EventWriter<SelectEvent>,
) {
    for event in runtime.drain_events() {
        match event {
            XrEvent::SessionEnded(id) => match ctx.session() {
                Some(active) if active.session.id == id => {
                    commands.trigger_targets(SessionEnd { session: id }, active.entity);
                }
                _ => debug!(target: "session", "end of unknown session {id} ignored"),
            },
            XrEvent::Select(id) if ctx.session_id() == Some(id) => {
                selects.write(SelectEvent { origin: SelectOrigin::Controller });
            }
            XrEvent::Select(_) => {}
        }
    }
}

pub fn begin_xr_frame(
    time: Res<Time>,
    mut runtime: ResMut<XrRuntimeRes>,
    ctx: Res<ArSessionContext>,
    mut current: ResMut<CurrentXrFrame>,
) {
    let session = ctx.session().map(|a| &a.session);
    current.0 = runtime.begin_frame(session, time.elapsed_secs_f64());
}

pub fn advance_frame_loop(
    mut ctx: ResMut<ArSessionContext>,
    mut runtime: ResMut<XrRuntimeRes>,
    current: Res<CurrentXrFrame>,
) {
    if ctx.session().is_none() {
        return;
    }
    ctx.tick(runtime.0.as_mut(), current.0.as_ref());
}

pub fn place_on_select(
    mut commands: Commands,
    mut selects: EventReader<SelectEvent>,
    ctx: Res<ArSessionContext>,
    mut placer: ResMut<ObjectPlacer>,
) {
    for ev in selects.read() {
        let Some(active) = ctx.session() else {
            continue;
        };
        let placed = placer.place(&mut commands, ctx.template(), ctx.reticle(), Some(active.session.id));
        if placed.is_none() {
            debug!(
                target: "placement",
                "select from {:?} ignored (reticle visible={}, template loaded={})",
                ev.origin,
                ctx.reticle().visible,
                ctx.template().is_some()
            );
        }
    }
}
