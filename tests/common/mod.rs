#![allow(dead_code)]

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use ar_placement::app::state::ArSessionState;
use ar_placement::interaction::session::lifecycle::SessionCommand;
use ar_placement::placement::ArSessionContext;
use ar_placement::xr::{Hit, ManualRuntime, XrRuntimeRes};
use ar_placement::{AppConfig, ArPlacementPlugin, PlacedObject};

/// Headless app driven by a scripted runtime. The returned runtime handle
/// shares state with the one inside the app.
pub fn ar_app_with(runtime: ManualRuntime, cfg: AppConfig) -> (App, ManualRuntime) {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(cfg)
        .insert_resource(XrRuntimeRes::new(runtime.clone()))
        .add_plugins(ArPlacementPlugin);
    (app, runtime)
}

pub fn ar_app() -> (App, ManualRuntime) {
    ar_app_with(ManualRuntime::new(), AppConfig::default())
}

pub fn state(app: &App) -> ArSessionState {
    *app.world().resource::<State<ArSessionState>>().get()
}

pub fn ctx(app: &App) -> &ArSessionContext {
    app.world().resource::<ArSessionContext>()
}

/// Update until `done` holds; panics after `max` ticks.
pub fn run_until(app: &mut App, max: usize, done: impl Fn(&App) -> bool) {
    for _ in 0..max {
        if done(app) {
            return;
        }
        app.update();
    }
    assert!(done(app), "condition not reached within {max} ticks");
}

/// Drive capability check and a start command until the session is active.
pub fn start_session(app: &mut App) {
    run_until(app, 5, |a| state(a) == ArSessionState::Idle);
    app.world_mut().send_event(SessionCommand::Start);
    run_until(app, 5, |a| state(a) == ArSessionState::Active);
}

/// Give the context a template so placement is possible.
pub fn load_template(app: &mut App) {
    app.world_mut()
        .resource_mut::<ArSessionContext>()
        .set_template(Handle::<Scene>::default());
}

pub fn hit_at(pos: Vec3) -> Hit {
    Hit::new(Mat4::from_translation(pos))
}

pub fn placed(app: &mut App) -> Vec<(PlacedObject, Transform)> {
    let mut q = app.world_mut().query::<(&PlacedObject, &Transform)>();
    let mut v: Vec<_> = q.iter(app.world()).map(|(p, t)| (*p, *t)).collect();
    v.sort_by_key(|(p, _)| p.serial);
    v
}

/// Settle both acquisition steps, ticking in between so the channel can chain them.
pub fn make_channel_ready(app: &mut App, rt: &ManualRuntime) {
    run_until(app, 3, |_| rt.outstanding_reference_spaces() == 1);
    assert!(rt.resolve_reference_space());
    run_until(app, 3, |_| rt.outstanding_hit_test_sources() == 1);
    assert!(rt.resolve_hit_test_source());
    app.update();
}
