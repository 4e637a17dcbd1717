// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;
use bevy::window::CompositeAlphaMode;
use clap::Parser;
use std::path::PathBuf;

use ar_placement::interaction::session::config_hot_reload::{ConfigHotReloadPlugin, ConfigReloadSettings};
use ar_placement::xr::{SimulatedRuntime, SimulatedViewer, SimulatedViewerPlugin, ViewerRig, XrRuntimeRes};
use ar_placement::{AppConfig, ArPlacementPlugin, ArRenderingPlugin};

#[derive(Parser, Debug)]
#[command(about = "Place a model on surfaces found by AR hit testing")]
struct Cli {
    /// Extra config layer applied after assets/config/ar.ron and ar.local.ron.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Request a session as soon as AR support is confirmed.
    #[arg(long)]
    auto_start: bool,
}

// ---------------- Config Loading ----------------

#[cfg(target_arch = "wasm32")]
fn load_config(_layers: &[PathBuf]) -> AppConfig {
    // Embed base config (no layered local override on wasm).
    const RAW: &str = include_str!("../assets/config/ar.ron");
    AppConfig::from_ron_str(RAW).unwrap_or_else(|e| {
        warn!("CONFIG (wasm) parse failure: {e}; using defaults");
        AppConfig::default()
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(layers: &[PathBuf]) -> AppConfig {
    let (cfg, used, errors) = AppConfig::load_layered(layers);
    for e in errors {
        warn!("CONFIG LOAD ISSUE: {e}");
    }
    if used.is_empty() {
        info!("No config layers found; using defaults");
    } else {
        info!(?used, "Config layers loaded");
    }
    cfg
}

fn config_layers(cli: &Cli) -> Vec<PathBuf> {
    let mut layers = vec![
        PathBuf::from("assets/config/ar.ron"),
        PathBuf::from("assets/config/ar.local.ron"),
    ];
    layers.extend(cli.config.clone());
    layers
}

// ---------------- Main ----------------

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        // Better panic messages on wasm
        console_error_panic_hook::set_once();
    }

    let cli = Cli::parse();
    let layers = config_layers(&cli);
    let mut cfg = load_config(&layers);
    if cli.auto_start {
        cfg.session.auto_start = true;
    }

    // Log validation warnings (non-fatal)
    for w in cfg.validate() {
        warn!("CONFIG WARNING: {w}");
    }
    info!(?cfg.window, "Window config");
    info!(
        required = ?cfg.session.required_features,
        reference_space = %cfg.session.reference_space,
        model = %cfg.model.path,
        "Session summary"
    );

    let viewer = SimulatedViewer::new(ViewerRig::from_config(&cfg.simulation.viewer));
    let runtime = SimulatedRuntime::new(cfg.simulation.clone(), viewer.clone());

    let mut app = App::new();
    app.insert_resource(cfg.clone())
        .insert_resource(XrRuntimeRes::new(runtime))
        .insert_resource(viewer)
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: cfg.window.title.clone(),
                    resolution: (cfg.window.width, cfg.window.height).into(),
                    resizable: true,
                    transparent: cfg.window.transparent,
                    composite_alpha_mode: if cfg.window.transparent {
                        CompositeAlphaMode::Auto
                    } else {
                        CompositeAlphaMode::Opaque
                    },
                    ..default()
                }),
                ..default()
            }),
        )
        .add_plugins((ArPlacementPlugin, ArRenderingPlugin, SimulatedViewerPlugin));

    // Watches the same layers that were loaded; inert on wasm.
    app.insert_resource(ConfigReloadSettings { paths: layers, ..default() })
        .add_plugins(ConfigHotReloadPlugin);

    app.run();
}
