// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::core::components::Reticle;
use crate::placement::context::ArSessionContext;
use crate::xr::{Hit, Pose, ReferenceSpace};

/// Latest surface snapshot. `pose` may be stale while hidden; consumers gate on `visible`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementReticle {
    pub visible: bool,
    pub pose: Pose,
}

impl Default for PlacementReticle {
    fn default() -> Self {
        Self { visible: false, pose: Pose::IDENTITY }
    }
}

impl PlacementReticle {
    /// First hit wins. No smoothing across ticks.
    pub fn update(&mut self, hits: &[Hit], space: &ReferenceSpace) {
        match hits.first() {
            Some(hit) => {
                self.pose = hit.pose(space);
                self.visible = true;
            }
            None => self.visible = false,
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Pose to place at, if the reticle currently shows a surface.
    pub fn snapshot(&self) -> Option<Pose> {
        self.visible.then_some(self.pose)
    }
}

/// Mirror the context's reticle onto the ring entity.
pub fn sync_reticle_visual(
    ctx: Res<ArSessionContext>,
    mut q: Query<(&mut Transform, &mut Visibility), With<Reticle>>,
) {
    let reticle = ctx.reticle();
    for (mut tf, mut vis) in q.iter_mut() {
        if reticle.visible {
            *tf = reticle.pose.to_transform();
            vis.set_if_neq(Visibility::Visible);
        } else {
            vis.set_if_neq(Visibility::Hidden);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xr::{ReferenceSpaceKind, SpaceId};

    fn floor() -> ReferenceSpace {
        ReferenceSpace { id: SpaceId(1), kind: ReferenceSpaceKind::LocalFloor, origin: Mat4::IDENTITY }
    }

    fn hit_at(x: f32, z: f32) -> Hit {
        Hit::new(Mat4::from_translation(Vec3::new(x, 0.0, z)))
    }

    #[test]
    fn empty_hits_hide_and_keep_stale_pose() {
        let mut r = PlacementReticle::default();
        r.update(&[hit_at(1.0, -1.0)], &floor());
        let before = r.pose;
        r.update(&[], &floor());
        assert!(!r.visible);
        assert_eq!(r.pose, before);
        assert!(r.snapshot().is_none());
    }

    #[test]
    fn first_hit_is_used_regardless_of_count() {
        let mut r = PlacementReticle::default();
        r.update(&[hit_at(0.5, -2.0), hit_at(3.0, -4.0), hit_at(9.0, 9.0)], &floor());
        assert!(r.visible);
        assert!((r.pose.position() - Vec3::new(0.5, 0.0, -2.0)).length() < 1e-5);

        let mut single = PlacementReticle::default();
        single.update(&[hit_at(0.5, -2.0)], &floor());
        assert_eq!(single, r);
    }

    #[test]
    fn pose_is_expressed_in_given_space() {
        let raised = ReferenceSpace {
            id: SpaceId(2),
            kind: ReferenceSpaceKind::Local,
            origin: Mat4::from_translation(Vec3::Y * 1.6),
        };
        let mut r = PlacementReticle::default();
        r.update(&[hit_at(0.0, -1.0)], &raised);
        assert!((r.pose.position() - Vec3::new(0.0, -1.6, -1.0)).length() < 1e-5);
    }
}
