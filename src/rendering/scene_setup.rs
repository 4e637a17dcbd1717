use bevy::prelude::*;

use crate::core::components::Reticle;
use crate::core::config::AppConfig;

pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_lighting, spawn_reticle));
    }
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::srgb(r, g, b)
}

fn midpoint(a: (f32, f32, f32), b: (f32, f32, f32)) -> (f32, f32, f32) {
    ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5, (a.2 + b.2) * 0.5)
}

/// Hemisphere-style lighting: sky/ground ambient plus a key light from `position`.
fn setup_lighting(mut commands: Commands, cfg: Res<AppConfig>) {
    let l = &cfg.lighting;
    commands.insert_resource(AmbientLight {
        color: rgb(midpoint(l.sky_color, l.ground_color)),
        brightness: 400.0 * l.intensity,
        ..default()
    });
    let (x, y, z) = l.position;
    commands.spawn((
        Name::new("KeyLight"),
        DirectionalLight { color: rgb(l.sky_color), illuminance: 3000.0 * l.intensity, ..default() },
        Transform::from_xyz(x, y, z).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Flat ring lying in the surface plane (+Y up). Hidden until the first hit.
fn spawn_reticle(
    mut commands: Commands,
    cfg: Res<AppConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let r = &cfg.reticle;
    let ring = Annulus::new(r.inner_radius, r.outer_radius)
        .mesh()
        .resolution(r.segments.max(3))
        .build()
        .rotated_by(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2));
    let material = StandardMaterial { base_color: rgb(r.color), unlit: true, ..default() };
    commands.spawn((
        Name::new("Reticle"),
        Reticle,
        Mesh3d(meshes.add(ring)),
        MeshMaterial3d(materials.add(material)),
        Visibility::Hidden,
    ));
}
