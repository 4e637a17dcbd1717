use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::core::config::AppConfig;
use crate::placement::context::ArSessionContext;

/// Scene handle being loaded. Removed once the outcome is known.
#[derive(Resource, Debug, Clone)]
pub struct TemplateLoading(pub Handle<Scene>);

pub struct TemplatePlugin;

impl Plugin for TemplatePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_template)
            .add_systems(Update, finish_template_load.run_if(resource_exists::<TemplateLoading>));
    }
}

fn load_template(mut commands: Commands, cfg: Res<AppConfig>, assets: Res<AssetServer>) {
    let path = cfg.model.path.trim();
    if path.is_empty() {
        warn!(target: "template", "no model path configured; placement disabled");
        return;
    }
    info!(target: "template", "loading template model {path}");
    let handle = assets.load(GltfAssetLabel::Scene(0).from_asset(path.to_string()));
    commands.insert_resource(TemplateLoading(handle));
}

/// Placement stays inert until this hands the loaded scene to the context.
fn finish_template_load(
    mut commands: Commands,
    loading: Res<TemplateLoading>,
    assets: Res<AssetServer>,
    mut ctx: ResMut<ArSessionContext>,
) {
    if assets.is_loaded_with_dependencies(&loading.0) {
        info!(target: "template", "template model ready");
        ctx.set_template(loading.0.clone());
        commands.remove_resource::<TemplateLoading>();
        return;
    }
    if let Some(LoadState::Failed(err)) = assets.get_load_state(&loading.0) {
        warn!(target: "template", "template model failed to load: {err}; placement disabled");
        commands.remove_resource::<TemplateLoading>();
    }
}
