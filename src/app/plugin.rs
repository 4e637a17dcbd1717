// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::app::state::ArSessionState;
use crate::core::config::AppConfig;
use crate::core::system::system_order::{
    FrameLoopSet, PlacementSet, PresentationSet, SessionSet, XrPumpSet,
};
use crate::debug::DebugPlugin;
use crate::interaction::input::select::SelectInputPlugin;
use crate::interaction::session::auto_close::AutoClosePlugin;
use crate::interaction::session::capability::SessionCapabilityPlugin;
use crate::interaction::session::lifecycle::SessionLifecyclePlugin;
use crate::placement::frame_loop::FrameLoopPlugin;

/// Session lifecycle, frame loop and placement. Needs an [`XrRuntimeRes`]
/// and the states plugin; renders nothing by itself.
///
/// [`XrRuntimeRes`]: crate::xr::XrRuntimeRes
pub struct ArPlacementPlugin;

impl Plugin for ArPlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_state::<ArSessionState>()
            .configure_sets(PreUpdate, XrPumpSet)
            .configure_sets(
                Update,
                (SessionSet, FrameLoopSet, PlacementSet, PresentationSet).chain(),
            )
            .add_plugins((
                SessionCapabilityPlugin,
                SessionLifecyclePlugin,
                FrameLoopPlugin,
                SelectInputPlugin,
                DebugPlugin,
                AutoClosePlugin,
            ));
    }
}
