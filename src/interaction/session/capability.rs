// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;
use std::task::Poll;

use crate::app::state::ArSessionState;
use crate::core::config::AppConfig;
use crate::core::system::system_order::SessionSet;
use crate::xr::{FeatureSet, Pending, SessionMode, XrRuntime, XrRuntimeRes};

/// Answer to "can an immersive AR session with the required features start?".
/// Fails closed: a rejected or dropped query counts as unsupported.
#[derive(Resource, Debug, Default)]
pub struct SessionCapability {
    query: Option<Pending<bool>>,
    supported: Option<bool>,
}

impl SessionCapability {
    /// Issue the query. Replaces any query still in flight.
    pub fn check(&mut self, runtime: &mut dyn XrRuntime, required: &FeatureSet) {
        self.supported = None;
        self.query = Some(runtime.is_session_supported(SessionMode::ImmersiveAr, required));
    }

    /// Poll the outstanding query; returns the answer once known.
    pub fn poll(&mut self) -> Option<bool> {
        if self.supported.is_some() {
            return self.supported;
        }
        let query = self.query.as_mut()?;
        let answer = match query.poll() {
            Poll::Pending => return None,
            Poll::Ready(Ok(ok)) => ok,
            Poll::Ready(Err(e)) => {
                warn!(target: "session", "capability query failed: {e}; treating AR as unsupported");
                false
            }
        };
        self.query = None;
        self.supported = Some(answer);
        self.supported
    }

    pub fn is_supported(&self) -> Option<bool> {
        self.supported
    }
}

pub struct SessionCapabilityPlugin;

impl Plugin for SessionCapabilityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionCapability>()
            .add_systems(Startup, start_capability_check)
            .add_systems(
                Update,
                resolve_capability
                    .run_if(in_state(ArSessionState::Checking))
                    .in_set(SessionSet),
            );
    }
}

fn start_capability_check(
    cfg: Res<AppConfig>,
    mut runtime: ResMut<XrRuntimeRes>,
    mut capability: ResMut<SessionCapability>,
) {
    let required = cfg.session.required();
    info!(
        target: "session",
        "checking immersive-ar support on `{}` runtime (required: {:?})",
        runtime.name(),
        cfg.session.required_features
    );
    capability.check(runtime.0.as_mut(), &required);
}

fn resolve_capability(
    mut capability: ResMut<SessionCapability>,
    mut next: ResMut<NextState<ArSessionState>>,
) {
    match capability.poll() {
        Some(true) => {
            info!(target: "session", "immersive-ar supported; AR entry enabled");
            next.set(ArSessionState::Idle);
        }
        Some(false) => {
            warn!(target: "session", "immersive-ar not supported; AR entry disabled");
            next.set(ArSessionState::Unsupported);
        }
        None => {}
    }
}
