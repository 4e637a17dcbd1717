// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::math::{Mat4, Quat, Vec3};
use bevy::prelude::Transform;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitTestSourceId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session features a runtime may grant. Display uses the WebXR feature strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureName {
    HitTest,
    LocalFloor,
    DomOverlay,
    Anchors,
    PlaneDetection,
    LightEstimation,
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HitTest => "hit-test",
            Self::LocalFloor => "local-floor",
            Self::DomOverlay => "dom-overlay",
            Self::Anchors => "anchors",
            Self::PlaneDetection => "plane-detection",
            Self::LightEstimation => "light-estimation",
        })
    }
}

impl FeatureName {
    pub const ALL: [FeatureName; 6] = [
        Self::HitTest,
        Self::LocalFloor,
        Self::DomOverlay,
        Self::Anchors,
        Self::PlaneDetection,
        Self::LightEstimation,
    ];
}

impl FromStr for FeatureName {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.to_string() == s)
            .ok_or_else(|| format!("unknown feature `{s}`"))
    }
}

pub type FeatureSet = BTreeSet<FeatureName>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionMode {
    #[default]
    ImmersiveAr,
    ImmersiveVr,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceSpaceKind {
    /// Tracks the device itself; used to aim hit-test rays.
    Viewer,
    Local,
    #[default]
    LocalFloor,
    BoundedFloor,
    Unbounded,
}

impl fmt::Display for ReferenceSpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Viewer => "viewer",
            Self::Local => "local",
            Self::LocalFloor => "local-floor",
            Self::BoundedFloor => "bounded-floor",
            Self::Unbounded => "unbounded",
        })
    }
}

impl FromStr for ReferenceSpaceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "local" => Ok(Self::Local),
            "local-floor" => Ok(Self::LocalFloor),
            "bounded-floor" => Ok(Self::BoundedFloor),
            "unbounded" => Ok(Self::Unbounded),
            other => Err(format!("unknown reference space `{other}`")),
        }
    }
}

/// Coordinate frame handle. `origin` is the space's pose in runtime tracking
/// coordinates, captured when the space was created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSpace {
    pub id: SpaceId,
    pub kind: ReferenceSpaceKind,
    pub origin: Mat4,
}

/// Rigid transform (position + orientation) as a column-major matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub matrix: Mat4,
}

impl Pose {
    pub const IDENTITY: Pose = Pose { matrix: Mat4::IDENTITY };

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self { matrix: Mat4::from_rotation_translation(rotation, translation) }
    }

    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_matrix(self.matrix)
    }
}

/// One candidate surface intersection, ordered by the runtime (closest first).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Pose of the intersection in runtime tracking coordinates; +Y is the surface normal.
    pub tracking_from_hit: Mat4,
}

impl Hit {
    pub fn new(tracking_from_hit: Mat4) -> Self {
        Self { tracking_from_hit }
    }

    /// Pose of this hit expressed in `space`.
    pub fn pose(&self, space: &ReferenceSpace) -> Pose {
        Pose::from_matrix(space.origin.inverse() * self.tracking_from_hit)
    }
}

/// Options passed when requesting a session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionInit {
    pub mode: SessionMode,
    pub required_features: FeatureSet,
    pub optional_features: FeatureSet,
    /// Space used to render and to interpret hit poses.
    pub reference_space: ReferenceSpaceKind,
}

/// Handle to an active AR runtime context.
#[derive(Debug, Clone, PartialEq)]
pub struct XrSession {
    pub id: SessionId,
    pub mode: SessionMode,
    pub granted_features: FeatureSet,
    pub render_space: ReferenceSpace,
}

impl XrSession {
    pub fn has_feature(&self, feature: FeatureName) -> bool {
        self.granted_features.contains(&feature)
    }
}

/// Active hit-test query bound to the space it was requested with.
#[derive(Debug, Clone, PartialEq)]
pub struct HitTestSource {
    pub id: HitTestSourceId,
    pub session: SessionId,
    pub space: ReferenceSpace,
}

/// Per-tick tracking context. Its presence means the session is tracking this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct XrFrame {
    pub session: SessionId,
    pub time: f64,
    /// Viewer pose in the session's render space, when tracked.
    pub viewer: Option<Pose>,
    results: Vec<(HitTestSourceId, Vec<Hit>)>,
}

impl XrFrame {
    pub fn new(session: SessionId, time: f64) -> Self {
        Self { session, time, viewer: None, results: Vec::new() }
    }

    pub fn with_viewer(mut self, viewer: Pose) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn with_hits(mut self, source: HitTestSourceId, hits: Vec<Hit>) -> Self {
        self.results.retain(|(id, _)| *id != source);
        self.results.push((source, hits));
        self
    }

    /// Ordered results for `source`; empty if the source belongs to another session
    /// or produced nothing this tick.
    pub fn hit_test_results(&self, source: &HitTestSource) -> &[Hit] {
        if source.session != self.session {
            return &[];
        }
        self.results
            .iter()
            .find(|(id, _)| *id == source.id)
            .map(|(_, hits)| hits.as_slice())
            .unwrap_or(&[])
    }
}

/// Notifications drained from the runtime once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrEvent {
    /// Session ended (user stop, app close or runtime error).
    SessionEnded(SessionId),
    /// Primary action on an input source ("select").
    Select(SessionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(kind: ReferenceSpaceKind, origin: Mat4) -> ReferenceSpace {
        ReferenceSpace { id: SpaceId(1), kind, origin }
    }

    #[test]
    fn hit_pose_is_relative_to_space_origin() {
        let hit = Hit::new(Mat4::from_translation(Vec3::new(1.0, 0.0, -2.0)));
        let floor = space(ReferenceSpaceKind::LocalFloor, Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0)));
        let pose = hit.pose(&floor);
        assert!((pose.position() - Vec3::new(1.0, 1.5, -2.0)).length() < 1e-5);
    }

    #[test]
    fn frame_hides_results_of_foreign_sources() {
        let source = HitTestSource {
            id: HitTestSourceId(3),
            session: SessionId(1),
            space: space(ReferenceSpaceKind::Viewer, Mat4::IDENTITY),
        };
        let hits = vec![Hit::new(Mat4::IDENTITY)];
        let frame = XrFrame::new(SessionId(2), 0.0).with_hits(HitTestSourceId(3), hits.clone());
        assert!(frame.hit_test_results(&source).is_empty());
        let frame = XrFrame::new(SessionId(1), 0.0).with_hits(HitTestSourceId(3), hits);
        assert_eq!(frame.hit_test_results(&source).len(), 1);
    }

    #[test]
    fn feature_names_match_webxr_strings() {
        assert_eq!(FeatureName::HitTest.to_string(), "hit-test");
        assert_eq!(ReferenceSpaceKind::LocalFloor.to_string(), "local-floor");
        assert_eq!("plane-detection".parse::<FeatureName>(), Ok(FeatureName::PlaneDetection));
        assert!("hit_test".parse::<FeatureName>().is_err());
    }
}
