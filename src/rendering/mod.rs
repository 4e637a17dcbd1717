//! Visible side of the app: camera, lights, reticle ring and the template model.

pub mod camera;
pub mod scene_setup;
pub mod template;

use bevy::prelude::*;

pub struct ArRenderingPlugin;

impl Plugin for ArRenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            camera::CameraPlugin,
            scene_setup::SceneSetupPlugin,
            template::TemplatePlugin,
        ));
    }
}
