// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::core::components::PlacedObject;
use crate::core::config::{AppConfig, PlacementConfig};
use crate::placement::reticle::PlacementReticle;
use crate::xr::SessionId;

/// Spawns placed copies of the template. Each copy is a fresh `SceneRoot`
/// sharing the template's scene asset; the handle itself is never touched.
#[derive(Resource, Debug, Clone)]
pub struct ObjectPlacer {
    /// Copy the full reticle matrix; when false only the position is used and
    /// the object stays upright.
    pub align_to_surface: bool,
    /// Oldest placements are despawned past this count. 0 disables eviction.
    pub max_placed: usize,
    next_serial: u64,
}

impl Default for ObjectPlacer {
    fn default() -> Self {
        Self::from_config(&PlacementConfig::default())
    }
}

impl ObjectPlacer {
    pub fn from_config(cfg: &PlacementConfig) -> Self {
        Self { align_to_surface: cfg.align_to_surface, max_placed: cfg.max_placed, next_serial: 0 }
    }

    pub fn placed_total(&self) -> u64 {
        self.next_serial
    }

    /// Transform a placement would receive for `reticle`, or None when it is hidden.
    pub fn placement_transform(&self, reticle: &PlacementReticle) -> Option<Transform> {
        let pose = reticle.snapshot()?;
        Some(if self.align_to_surface {
            pose.to_transform()
        } else {
            Transform::from_translation(pose.position())
        })
    }

    /// Inert when the reticle is hidden or the template has not loaded.
    pub fn place(
        &mut self,
        commands: &mut Commands,
        template: Option<&Handle<Scene>>,
        reticle: &PlacementReticle,
        session: Option<SessionId>,
    ) -> Option<Entity> {
        let template = template?;
        let transform = self.placement_transform(reticle)?;
        let serial = self.next_serial;
        self.next_serial += 1;
        let entity = commands
            .spawn((
                Name::new(format!("Placed#{serial}")),
                SceneRoot(template.clone()),
                transform,
                PlacedObject { serial, session },
            ))
            .id();
        info!(
            target: "placement",
            "ObjectPlacer: placed #{serial} at {:?}",
            transform.translation
        );
        Some(entity)
    }
}

/// Keep the placer in step with hot-reloaded placement settings.
pub fn sync_placer_config(cfg: Res<AppConfig>, mut placer: ResMut<ObjectPlacer>) {
    if !cfg.is_changed() {
        return;
    }
    let p = &cfg.placement;
    if placer.align_to_surface != p.align_to_surface || placer.max_placed != p.max_placed {
        placer.align_to_surface = p.align_to_surface;
        placer.max_placed = p.max_placed;
    }
}

/// Despawn the oldest placements beyond `max_placed`.
pub fn evict_excess_placements(
    mut commands: Commands,
    placer: Res<ObjectPlacer>,
    q: Query<(Entity, &PlacedObject)>,
) {
    if placer.max_placed == 0 {
        return;
    }
    let count = q.iter().count();
    if count <= placer.max_placed {
        return;
    }
    let mut placed: Vec<(Entity, u64)> = q.iter().map(|(e, p)| (e, p.serial)).collect();
    placed.sort_by_key(|(_, serial)| *serial);
    for (entity, serial) in placed.into_iter().take(count - placer.max_placed) {
        debug!(target: "placement", "evicting placement #{serial}");
        commands.entity(entity).despawn();
    }
}
