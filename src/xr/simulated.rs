// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Desktop stand-in for an AR runtime.
//!
//! Surfaces are configured planes; hit tests cast a ray along the viewer's
//! forward axis. Requests settle after a configurable number of ticks so the
//! async acquisition path is exercised the same way a device would.

use bevy::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::XrError;
use super::pending::{pending, Pending, Resolver, XrResult};
use super::runtime::XrRuntime;
use super::types::{
    FeatureName, FeatureSet, Hit, HitTestSource, HitTestSourceId, Pose, ReferenceSpace,
    ReferenceSpaceKind, SessionId, SessionInit, SessionMode, SpaceId, XrEvent, XrFrame, XrSession,
};
use crate::core::config::{parse_features, SimPlaneConfig, SimulationConfig, ViewerRigConfig};

/// Position and heading of the simulated device, in tracking coordinates (floor at y = 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerRig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl ViewerRig {
    /// Standing at the origin at `height`, facing -Z, tilted by `pitch_deg`.
    pub fn from_config(cfg: &ViewerRigConfig) -> Self {
        Self { position: Vec3::new(0.0, cfg.height, 0.0), yaw: 0.0, pitch: cfg.pitch_deg.to_radians() }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }
}

/// Shared handle so input systems can steer the viewer the runtime tracks.
#[derive(Resource, Clone, Debug)]
pub struct SimulatedViewer(Arc<Mutex<ViewerRig>>);

impl SimulatedViewer {
    pub fn new(rig: ViewerRig) -> Self {
        Self(Arc::new(Mutex::new(rig)))
    }

    pub fn lock(&self) -> MutexGuard<'_, ViewerRig> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> ViewerRig {
        *self.lock()
    }
}

#[derive(Debug, Clone, Copy)]
struct Plane {
    center: Vec3,
    normal: Vec3,
    radius: f32,
}

impl From<&SimPlaneConfig> for Plane {
    fn from(cfg: &SimPlaneConfig) -> Self {
        let (cx, cy, cz) = cfg.center;
        let (nx, ny, nz) = cfg.normal;
        Self {
            center: Vec3::new(cx, cy, cz),
            normal: Vec3::new(nx, ny, nz).normalize_or(Vec3::Y),
            radius: cfg.radius,
        }
    }
}

impl Plane {
    /// Distance along the ray to the intersection, if it lies on the plane's disk.
    fn intersect(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        let denom = self.normal.dot(dir);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = self.normal.dot(self.center - origin) / denom;
        if t <= 0.0 || t > max_distance {
            return None;
        }
        let point = origin + dir * t;
        (point.distance(self.center) <= self.radius).then_some(t)
    }

    fn hit_at(&self, point: Vec3) -> Hit {
        let rotation = Quat::from_rotation_arc(Vec3::Y, self.normal);
        Hit::new(Mat4::from_rotation_translation(rotation, point))
    }
}

struct Scheduled {
    frames_left: u32,
    session: Option<SessionId>,
    deliver: Box<dyn FnOnce() + Send + Sync>,
}

struct ActiveSession {
    session: XrSession,
    sources: Vec<HitTestSource>,
}

pub struct SimulatedRuntime {
    cfg: SimulationConfig,
    planes: Vec<Plane>,
    viewer: SimulatedViewer,
    active: Option<ActiveSession>,
    scheduled: Vec<Scheduled>,
    events: Vec<XrEvent>,
    next_id: u64,
}

impl SimulatedRuntime {
    pub fn new(cfg: SimulationConfig, viewer: SimulatedViewer) -> Self {
        let planes = cfg.planes.iter().map(Plane::from).collect();
        Self { cfg, planes, viewer, active: None, scheduled: Vec::new(), events: Vec::new(), next_id: 1 }
    }

    pub fn viewer(&self) -> SimulatedViewer {
        self.viewer.clone()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn supported_features(&self) -> FeatureSet {
        parse_features(&self.cfg.supported_features).0
    }

    fn schedule<T: Send + Sync + 'static>(
        &mut self,
        session: Option<SessionId>,
        delay: u32,
        value: XrResult<T>,
    ) -> Pending<T> {
        let (resolver, pending): (Resolver<T>, Pending<T>) = pending();
        self.scheduled.push(Scheduled {
            frames_left: delay,
            session,
            deliver: Box::new(move || {
                resolver.settle(value);
            }),
        });
        pending
    }

    fn live_session(&self, session: &XrSession) -> Option<&ActiveSession> {
        self.active.as_ref().filter(|a| a.session.id == session.id)
    }

    fn space_origin(&self, kind: ReferenceSpaceKind) -> Mat4 {
        let rig = self.viewer.get();
        match kind {
            ReferenceSpaceKind::Viewer => rig.matrix(),
            ReferenceSpaceKind::Local => Mat4::from_translation(Vec3::new(0.0, rig.position.y, 0.0)),
            ReferenceSpaceKind::LocalFloor
            | ReferenceSpaceKind::BoundedFloor
            | ReferenceSpaceKind::Unbounded => Mat4::IDENTITY,
        }
    }

    fn make_space(&mut self, kind: ReferenceSpaceKind) -> ReferenceSpace {
        ReferenceSpace { id: SpaceId(self.next_id()), kind, origin: self.space_origin(kind) }
    }

    fn cast(&self, rig: &ViewerRig) -> Vec<Hit> {
        let origin = rig.position;
        let dir = rig.forward();
        let mut hits: Vec<(f32, Hit)> = self
            .planes
            .iter()
            .filter_map(|p| {
                p.intersect(origin, dir, self.cfg.max_hit_distance)
                    .map(|t| (t, p.hit_at(origin + dir * t)))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, h)| h).collect()
    }

    fn deliver_due(&mut self) {
        let mut due = Vec::new();
        let mut keep = Vec::with_capacity(self.scheduled.len());
        for mut s in self.scheduled.drain(..) {
            if s.frames_left == 0 {
                due.push(s);
            } else {
                s.frames_left -= 1;
                keep.push(s);
            }
        }
        self.scheduled = keep;
        for s in due {
            (s.deliver)();
        }
    }
}

impl XrRuntime for SimulatedRuntime {
    fn name(&self) -> &str {
        "simulated"
    }

    fn is_session_supported(&mut self, mode: SessionMode, required: &FeatureSet) -> Pending<bool> {
        let supported = self.supported_features();
        let ok = self.cfg.ar_supported
            && mode == SessionMode::ImmersiveAr
            && required.iter().all(|f| supported.contains(f));
        self.schedule(None, self.cfg.session_delay_frames, Ok(ok))
    }

    fn request_session(&mut self, init: &SessionInit) -> Pending<XrSession> {
        if !self.cfg.ar_supported || init.mode != SessionMode::ImmersiveAr {
            return Pending::rejected(XrError::NotSupported);
        }
        if self.active.is_some() {
            return Pending::rejected(XrError::Runtime("a session is already active".into()));
        }
        let supported = self.supported_features();
        if let Some(missing) = init.required_features.iter().find(|f| !supported.contains(*f)) {
            return Pending::rejected(XrError::FeatureUnsupported(*missing));
        }
        let granted: FeatureSet = init
            .required_features
            .iter()
            .chain(init.optional_features.iter().filter(|f| supported.contains(*f)))
            .copied()
            .collect();
        let id = SessionId(self.next_id());
        let render_space = self.make_space(init.reference_space);
        let session = XrSession { id, mode: init.mode, granted_features: granted, render_space };
        self.active = Some(ActiveSession { session: session.clone(), sources: Vec::new() });
        info!(target: "xr", "Simulated session {id} created");
        self.schedule(Some(id), self.cfg.session_delay_frames, Ok(session))
    }

    fn request_reference_space(
        &mut self,
        session: &XrSession,
        kind: ReferenceSpaceKind,
    ) -> Pending<ReferenceSpace> {
        if self.live_session(session).is_none() {
            return Pending::rejected(XrError::SessionEnded(session.id));
        }
        let value = if self.cfg.fail_reference_space {
            Err(XrError::SpaceUnavailable(kind))
        } else {
            Ok(self.make_space(kind))
        };
        self.schedule(Some(session.id), self.cfg.acquire_delay_frames, value)
    }

    fn request_hit_test_source(
        &mut self,
        session: &XrSession,
        space: &ReferenceSpace,
    ) -> Pending<HitTestSource> {
        if self.live_session(session).is_none() {
            return Pending::rejected(XrError::SessionEnded(session.id));
        }
        if !session.has_feature(FeatureName::HitTest) {
            return Pending::rejected(XrError::FeatureUnsupported(FeatureName::HitTest));
        }
        let value = if self.cfg.fail_hit_test_source {
            Err(XrError::Runtime("hit-test source request rejected".into()))
        } else {
            let source = HitTestSource {
                id: HitTestSourceId(self.next_id()),
                session: session.id,
                space: *space,
            };
            if let Some(active) = self.active.as_mut() {
                active.sources.push(source.clone());
            }
            Ok(source)
        };
        self.schedule(Some(session.id), self.cfg.acquire_delay_frames, value)
    }

    fn end_session(&mut self, session: &XrSession) {
        if self.live_session(session).is_none() {
            return;
        }
        self.active = None;
        // Unsettled requests of the dead session are dropped with their resolvers.
        self.scheduled.retain(|s| s.session != Some(session.id));
        self.events.push(XrEvent::SessionEnded(session.id));
        info!(target: "xr", "Simulated session {} ended", session.id);
    }

    fn begin_frame(&mut self, session: Option<&XrSession>, time: f64) -> Option<XrFrame> {
        self.deliver_due();
        let session = session?;
        let active = self.live_session(session)?;
        let rig = self.viewer.get();
        let render_space = active.session.render_space;
        let viewer = Pose::from_matrix(render_space.origin.inverse() * rig.matrix());
        let hits = self.cast(&rig);
        let mut frame = XrFrame::new(session.id, time).with_viewer(viewer);
        for source in &active.sources {
            frame = frame.with_hits(source.id, hits.clone());
        }
        Some(frame)
    }

    fn drain_events(&mut self) -> Vec<XrEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Keyboard steering for the simulated viewer: WASD moves, arrow keys look around.
pub struct SimulatedViewerPlugin;

impl Plugin for SimulatedViewerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, steer_simulated_viewer);
    }
}

fn steer_simulated_viewer(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    viewer: Option<Res<SimulatedViewer>>,
    cfg: Res<crate::core::config::AppConfig>,
) {
    let Some(viewer) = viewer else { return };
    let dt = time.delta_secs();
    let rig_cfg = &cfg.simulation.viewer;
    let mut rig = viewer.lock();
    let turn = rig_cfg.turn_speed_deg.to_radians() * dt;
    if keys.pressed(KeyCode::ArrowLeft) {
        rig.yaw += turn;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        rig.yaw -= turn;
    }
    if keys.pressed(KeyCode::ArrowUp) {
        rig.pitch = (rig.pitch + turn).min(std::f32::consts::FRAC_PI_2 - 0.01);
    }
    if keys.pressed(KeyCode::ArrowDown) {
        rig.pitch = (rig.pitch - turn).max(-std::f32::consts::FRAC_PI_2 + 0.01);
    }
    let flat_forward = Quat::from_rotation_y(rig.yaw) * Vec3::NEG_Z;
    let right = Quat::from_rotation_y(rig.yaw) * Vec3::X;
    let mut step = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        step += flat_forward;
    }
    if keys.pressed(KeyCode::KeyS) {
        step -= flat_forward;
    }
    if keys.pressed(KeyCode::KeyD) {
        step += right;
    }
    if keys.pressed(KeyCode::KeyA) {
        step -= right;
    }
    if step != Vec3::ZERO {
        rig.position += step.normalize() * rig_cfg.move_speed * dt;
    }
}
