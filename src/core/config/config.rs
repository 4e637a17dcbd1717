// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::xr::types::{FeatureName, FeatureSet, ReferenceSpaceKind, SessionInit, SessionMode};

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Lets the camera feed show through where nothing is drawn.
    pub transparent: bool,
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "AR Placement".into(),
            transparent: true,
            auto_close: 0.0,
        }
    }
}

/// Feature and space names use the WebXR strings ("hit-test", "local-floor", ...).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub required_features: Vec<String>,
    pub optional_features: Vec<String>,
    pub reference_space: String,
    /// Request a session as soon as support is confirmed.
    pub auto_start: bool,
}
impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            required_features: vec!["hit-test".into()],
            optional_features: vec!["dom-overlay".into()],
            reference_space: "local-floor".into(),
            auto_start: false,
        }
    }
}
impl SessionConfig {
    /// Known features; unknown names are skipped (reported by `validate`).
    pub fn required(&self) -> FeatureSet {
        parse_features(&self.required_features).0
    }

    pub fn optional(&self) -> FeatureSet {
        parse_features(&self.optional_features).0
    }

    pub fn reference_space_kind(&self) -> ReferenceSpaceKind {
        self.reference_space.parse().unwrap_or_default()
    }

    pub fn session_init(&self) -> SessionInit {
        SessionInit {
            mode: SessionMode::ImmersiveAr,
            required_features: self.required(),
            optional_features: self.optional(),
            reference_space: self.reference_space_kind(),
        }
    }
}

/// Split feature names into the recognised set and the unknown names.
pub fn parse_features(names: &[String]) -> (FeatureSet, Vec<String>) {
    let mut known = FeatureSet::new();
    let mut unknown = Vec::new();
    for name in names {
        match name.parse::<FeatureName>() {
            Ok(f) => {
                known.insert(f);
            }
            Err(_) => unknown.push(name.clone()),
        }
    }
    (known, unknown)
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReticleConfig {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub segments: u32,
    pub color: (f32, f32, f32),
}
impl Default for ReticleConfig {
    fn default() -> Self {
        Self { inner_radius: 0.15, outer_radius: 0.2, segments: 32, color: (1.0, 1.0, 1.0) }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// glTF file under `assets/`; scene 0 becomes the placement template.
    pub path: String,
}
impl Default for ModelConfig {
    fn default() -> Self {
        Self { path: "models/marker.gltf".into() }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}
impl Default for CameraConfig {
    fn default() -> Self {
        Self { fov_deg: 70.0, near: 0.01, far: 20.0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub sky_color: (f32, f32, f32),
    pub ground_color: (f32, f32, f32),
    pub intensity: f32,
    pub position: (f32, f32, f32),
}
impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            sky_color: (1.0, 1.0, 1.0),
            ground_color: (0.733, 0.733, 1.0),
            intensity: 1.0,
            position: (0.5, 1.0, 0.25),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    /// Use the full surface pose; when false only the position is copied and the object stays upright.
    pub align_to_surface: bool,
    /// Oldest placements are despawned beyond this count. 0 keeps everything.
    pub max_placed: usize,
}
impl Default for PlacementConfig {
    fn default() -> Self {
        Self { align_to_surface: true, max_placed: 0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimPlaneConfig {
    pub center: (f32, f32, f32),
    pub normal: (f32, f32, f32),
    pub radius: f32,
}
impl Default for SimPlaneConfig {
    fn default() -> Self {
        Self { center: (0.0, 0.0, 0.0), normal: (0.0, 1.0, 0.0), radius: 10.0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerRigConfig {
    pub height: f32,
    pub pitch_deg: f32,
    pub move_speed: f32,
    pub turn_speed_deg: f32,
}
impl Default for ViewerRigConfig {
    fn default() -> Self {
        Self { height: 1.5, pitch_deg: -35.0, move_speed: 1.0, turn_speed_deg: 60.0 }
    }
}

/// Parameters of the desktop runtime used when no AR device is attached.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub ar_supported: bool,
    pub supported_features: Vec<String>,
    pub session_delay_frames: u32,
    /// Ticks before each acquisition step (reference space, hit-test source) settles.
    pub acquire_delay_frames: u32,
    pub fail_reference_space: bool,
    pub fail_hit_test_source: bool,
    pub max_hit_distance: f32,
    pub planes: Vec<SimPlaneConfig>,
    pub viewer: ViewerRigConfig,
}
impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ar_supported: true,
            supported_features: vec!["hit-test".into(), "local-floor".into(), "dom-overlay".into()],
            session_delay_frames: 1,
            acquire_delay_frames: 2,
            fail_reference_space: false,
            fail_hit_test_source: false,
            max_hit_distance: 20.0,
            planes: vec![SimPlaneConfig::default()],
            viewer: ViewerRigConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub log_interval: f32,
}
impl Default for DebugConfig {
    fn default() -> Self {
        Self { log_interval: 2.0 }
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub session: SessionConfig,
    pub reticle: ReticleConfig,
    pub model: ModelConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub placement: PlacementConfig,
    pub simulation: SimulationConfig,
    pub debug: DebugConfig,
}

impl AppConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        Self::from_ron_str(&data)
    }
    pub fn from_ron_str(data: &str) -> Result<Self, String> {
        ron::from_str(data).map_err(|e| format!("parse RON: {e}"))
    }
    /// Merge RON files in order (later keys win, maps merge recursively).
    /// Returns the config, the paths that contributed, and non-fatal errors.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        if let Some((_, ev)) = bm.iter_mut().find(|(ek, _)| **ek == k) {
                            merge_value(ev, v);
                            continue;
                        }
                        bm.insert(k, v);
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        match merged {
            Some(val) => match val.into_rust::<AppConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!("failed to deserialize merged config; using defaults: {e}"));
                    (AppConfig::default(), used, errors)
                }
            },
            None => (AppConfig::default(), used, errors),
        }
    }
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        }
        for (label, names) in [
            ("session.required_features", &self.session.required_features),
            ("session.optional_features", &self.session.optional_features),
            ("simulation.supported_features", &self.simulation.supported_features),
        ] {
            for name in parse_features(names).1 {
                w.push(format!("{label}: unknown feature \"{name}\" ignored"));
            }
        }
        if !self.session.required().contains(&FeatureName::HitTest) {
            w.push("session.required_features lacks \"hit-test\"; the reticle may never appear".into());
        }
        match self.session.reference_space.parse::<ReferenceSpaceKind>() {
            Ok(ReferenceSpaceKind::Viewer) => {
                w.push("session.reference_space \"viewer\" makes placed objects follow the device".into())
            }
            Ok(_) => {}
            Err(e) => w.push(format!("session.reference_space: {e}; using local-floor")),
        }
        let r = &self.reticle;
        if r.inner_radius < 0.0 || r.outer_radius <= r.inner_radius {
            w.push(format!(
                "reticle radii invalid: inner {} outer {} (need 0 <= inner < outer)",
                r.inner_radius, r.outer_radius
            ));
        }
        if r.segments < 3 {
            w.push(format!("reticle.segments {} < 3", r.segments));
        }
        if self.model.path.trim().is_empty() {
            w.push("model.path empty; placement will stay inert".into());
        }
        let c = &self.camera;
        if !(1.0..=179.0).contains(&c.fov_deg) {
            w.push(format!("camera.fov_deg {} outside 1..179", c.fov_deg));
        }
        if c.near <= 0.0 || c.far <= c.near {
            w.push(format!("camera clip planes invalid: near {} far {}", c.near, c.far));
        }
        if self.lighting.intensity < 0.0 {
            w.push("lighting.intensity negative".into());
        }
        let s = &self.simulation;
        if s.max_hit_distance <= 0.0 {
            w.push("simulation.max_hit_distance must be > 0".into());
        }
        if s.ar_supported && s.planes.is_empty() {
            w.push("simulation.planes empty; hit tests will never succeed".into());
        }
        for (i, p) in s.planes.iter().enumerate() {
            if p.radius <= 0.0 {
                w.push(format!("simulation.planes[{i}].radius must be > 0"));
            }
            let (nx, ny, nz) = p.normal;
            if nx * nx + ny * ny + nz * nz < 1e-8 {
                w.push(format!("simulation.planes[{i}].normal is zero"));
            }
        }
        if self.debug.log_interval <= 0.0 {
            w.push("debug.log_interval must be > 0".into());
        }
        w
    }
}
