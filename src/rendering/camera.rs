use bevy::prelude::*;
use bevy::render::camera::ClearColorConfig;

use crate::core::components::ArCamera;
use crate::core::config::{AppConfig, CameraConfig};
use crate::core::system::system_order::PresentationSet;
use crate::xr::CurrentXrFrame;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(Update, follow_viewer_pose.in_set(PresentationSet));
    }
}

pub fn perspective(cfg: &CameraConfig) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: cfg.fov_deg.to_radians(),
        near: cfg.near,
        far: cfg.far,
        ..default()
    })
}

fn setup_camera(mut commands: Commands, cfg: Res<AppConfig>) {
    // Transparent clear lets the device camera feed show behind the scene.
    let clear_color = if cfg.window.transparent {
        ClearColorConfig::Custom(Color::NONE)
    } else {
        ClearColorConfig::Default
    };
    commands.spawn((
        Name::new("ArCamera"),
        ArCamera,
        Camera3d::default(),
        Camera { clear_color, ..default() },
        perspective(&cfg.camera),
        Transform::from_xyz(0.0, cfg.simulation.viewer.height, 0.0),
    ));
}

/// Camera mirrors the tracked viewer pose; untracked ticks keep the last pose.
pub fn follow_viewer_pose(
    frame: Res<CurrentXrFrame>,
    mut q: Query<&mut Transform, With<ArCamera>>,
) {
    let Some(viewer) = frame.0.as_ref().and_then(|f| f.viewer) else {
        return;
    };
    for mut tf in q.iter_mut() {
        *tf = viewer.to_transform();
    }
}
