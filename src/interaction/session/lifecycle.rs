// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session start / stop.
//!
//! [`SessionCommand`] is the contract of the AR entry button. A granted session
//! gets its own entity with a [`SessionEnd`] observer attached; the observer is
//! the only place session resources are released, and it goes away with the
//! entity, so teardown runs once per session.

use bevy::prelude::*;
use std::task::Poll;

use crate::app::state::ArSessionState;
use crate::core::components::ArSessionEntity;
use crate::core::config::AppConfig;
use crate::core::system::system_order::SessionSet;
use crate::placement::context::ArSessionContext;
use crate::xr::{Pending, SessionId, XrRuntimeRes, XrSession};

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    Toggle,
}

/// Delivered to the session entity when the runtime reports the session over.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnd {
    pub session: SessionId,
}

/// Session request awaiting the runtime. A stop issued meanwhile is kept and
/// applied to the session as soon as it is granted.
#[derive(Resource, Debug, Default)]
pub struct PendingSessionRequest {
    request: Option<Pending<XrSession>>,
    stop_requested: bool,
}

impl PendingSessionRequest {
    pub fn is_pending(&self) -> bool {
        self.request.is_some()
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}

pub struct SessionLifecyclePlugin;

impl Plugin for SessionLifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SessionCommand>()
            .init_resource::<PendingSessionRequest>()
            .add_systems(OnEnter(ArSessionState::Idle), auto_start_session)
            .add_systems(
                Update,
                (
                    handle_session_commands,
                    poll_session_request.run_if(in_state(ArSessionState::Starting)),
                )
                    .chain()
                    .in_set(SessionSet),
            );
    }
}

fn auto_start_session(
    cfg: Res<AppConfig>,
    mut started: Local<bool>,
    mut commands: EventWriter<SessionCommand>,
) {
    if cfg.session.auto_start && !*started {
        *started = true;
        info!(target: "session", "auto-start: requesting session");
        commands.write(SessionCommand::Start);
    }
}

pub fn handle_session_commands(
    mut events: EventReader<SessionCommand>,
    state: Res<State<ArSessionState>>,
    mut next: ResMut<NextState<ArSessionState>>,
    cfg: Res<AppConfig>,
    mut runtime: ResMut<XrRuntimeRes>,
    mut request: ResMut<PendingSessionRequest>,
    ctx: Res<ArSessionContext>,
) {
    // Transitions land next tick; remember them so one batch cannot double-start.
    let mut current = *state.get();
    for cmd in events.read() {
        match (cmd, current) {
            (SessionCommand::Start | SessionCommand::Toggle, ArSessionState::Idle) => {
                let init = cfg.session.session_init();
                info!(target: "session", "requesting {:?} session (required: {:?})", init.mode, init.required_features);
                request.request = Some(runtime.request_session(&init));
                request.stop_requested = false;
                next.set(ArSessionState::Starting);
                current = ArSessionState::Starting;
            }
            (SessionCommand::Stop | SessionCommand::Toggle, ArSessionState::Active) => {
                if let Some(active) = ctx.session() {
                    info!(target: "session", "ending session {}", active.session.id);
                    runtime.end_session(&active.session);
                }
            }
            (SessionCommand::Stop | SessionCommand::Toggle, ArSessionState::Starting) => {
                info!(target: "session", "stop while starting: session will end once granted");
                request.stop_requested = true;
            }
            (SessionCommand::Start, ArSessionState::Starting) => {
                request.stop_requested = false;
            }
            (SessionCommand::Start, ArSessionState::Checking | ArSessionState::Unsupported) => {
                info!(target: "session", "start ignored: AR is {:?}", current);
            }
            (cmd, other) => {
                debug!(target: "session", "{cmd:?} ignored in {other:?}");
            }
        }
    }
}

pub fn poll_session_request(
    mut commands: Commands,
    mut request: ResMut<PendingSessionRequest>,
    mut next: ResMut<NextState<ArSessionState>>,
    mut ctx: ResMut<ArSessionContext>,
    mut runtime: ResMut<XrRuntimeRes>,
) {
    let Some(pending) = request.request.as_mut() else {
        return;
    };
    let result = match pending.poll() {
        Poll::Pending => return,
        Poll::Ready(result) => result,
    };
    request.request = None;
    let stop_requested = std::mem::take(&mut request.stop_requested);
    match result {
        Ok(session) if stop_requested => {
            info!(target: "session", "session {} granted after stop; ending it", session.id);
            runtime.end_session(&session);
            next.set(ArSessionState::Idle);
        }
        Ok(session) => {
            let id = session.id;
            let entity = commands
                .spawn((Name::new(format!("ArSession{id}")), ArSessionEntity { id }))
                .observe(on_session_end)
                .id();
            info!(
                target: "session",
                "session {id} started (granted: {:?}, render space: {})",
                session.granted_features,
                session.render_space.kind
            );
            ctx.begin_session(session, entity);
            next.set(ArSessionState::Active);
        }
        Err(e) => {
            warn!(target: "session", "session request failed: {e}");
            next.set(ArSessionState::Idle);
        }
    }
}

/// Runs synchronously when the end is delivered: releases the hit-test source,
/// hides the reticle and removes the session entity together with this observer.
/// An end naming another session leaves everything in place.
fn on_session_end(
    trigger: Trigger<SessionEnd>,
    mut commands: Commands,
    mut ctx: ResMut<ArSessionContext>,
    mut next: ResMut<NextState<ArSessionState>>,
) {
    let id = trigger.event().session;
    if !ctx.end_session(id) {
        debug!(target: "session", "end of session {id} does not match the active one; ignored");
        return;
    }
    info!(target: "session", "session {id} ended; hit-test channel torn down");
    commands.entity(trigger.target()).despawn();
    next.set(ArSessionState::Idle);
}
