use bevy::prelude::*;
use std::{collections::HashMap, path::PathBuf, time::SystemTime};

use crate::core::config::AppConfig;

/// Files watched for changes, in layering order.
#[derive(Resource, Debug, Clone)]
pub struct ConfigReloadSettings {
    pub paths: Vec<PathBuf>,
    pub interval_secs: f32,
}

impl Default for ConfigReloadSettings {
    fn default() -> Self {
        Self {
            paths: vec![
                PathBuf::from("assets/config/ar.ron"),
                PathBuf::from("assets/config/ar.local.ron"),
            ],
            interval_secs: 0.5,
        }
    }
}

#[derive(Resource, Debug)]
struct ConfigReloadState {
    last_mod: HashMap<PathBuf, SystemTime>,
    timer: Timer,
}

impl FromWorld for ConfigReloadState {
    /// Starts from the files as they are now: the running config was loaded from
    /// them, possibly with command-line overrides a reload must not revert.
    fn from_world(world: &mut World) -> Self {
        let last_mod = world
            .get_resource::<ConfigReloadSettings>()
            .map(|settings| current_mod_times(&settings.paths))
            .unwrap_or_default();
        Self { last_mod, timer: Timer::from_seconds(0.5, TimerMode::Repeating) }
    }
}

fn current_mod_times(paths: &[PathBuf]) -> HashMap<PathBuf, SystemTime> {
    paths
        .iter()
        .filter_map(|p| {
            let modified = std::fs::metadata(p).and_then(|m| m.modified()).ok()?;
            Some((p.clone(), modified))
        })
        .collect()
}

pub struct ConfigHotReloadPlugin;

impl Plugin for ConfigHotReloadPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            app.init_resource::<ConfigReloadSettings>()
                .init_resource::<ConfigReloadState>()
                .add_systems(Update, poll_and_reload_config);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = app;
    }
}

/// True when any watched file is newer than last seen. A file not seen before
/// counts as changed once it exists.
fn scan_for_changes(settings: &ConfigReloadSettings, state: &mut ConfigReloadState) -> bool {
    use std::time::UNIX_EPOCH;
    let mut dirty = false;
    for path in &settings.paths {
        let Ok(mod_time) = std::fs::metadata(path).and_then(|m| m.modified()) else {
            continue;
        };
        let entry = state.last_mod.entry(path.clone()).or_insert(UNIX_EPOCH);
        if mod_time > *entry {
            *entry = mod_time;
            dirty = true;
        }
    }
    dirty
}

fn poll_and_reload_config(
    time: Res<Time>,
    settings: Res<ConfigReloadSettings>,
    mut state: ResMut<ConfigReloadState>,
    mut cfg_res: ResMut<AppConfig>,
    mut windows: Query<&mut Window>,
) {
    let interval = settings.interval_secs.max(0.05);
    if (state.timer.duration().as_secs_f32() - interval).abs() > f32::EPSILON {
        state.timer.set_duration(std::time::Duration::from_secs_f32(interval));
    }
    if !state.timer.tick(time.delta()).finished() {
        return;
    }
    if !scan_for_changes(&settings, &mut state) {
        return;
    }
    let (new_cfg, _used, errors) = AppConfig::load_layered(settings.paths.iter());
    for e in errors {
        warn!("CONFIG HOT-RELOAD issue: {e}");
    }
    if *cfg_res == new_cfg {
        return;
    }
    for w in new_cfg.validate() {
        warn!("CONFIG WARNING: {w}");
    }
    info!("Config hot-reload applied");
    if let Ok(mut window) = windows.single_mut() {
        if window.width() != new_cfg.window.width || window.height() != new_cfg.window.height {
            window.resolution.set(new_cfg.window.width, new_cfg.window.height);
        }
        if window.title != new_cfg.window.title {
            window.title = new_cfg.window.title.clone();
        }
    }
    *cfg_res = new_cfg;
}
