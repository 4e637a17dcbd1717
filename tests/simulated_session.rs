mod common;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use ar_placement::placement::{ArSessionContext, ChannelPhase};
use ar_placement::xr::{CurrentXrFrame, SimulatedRuntime, SimulatedViewer, ViewerRig, XrRuntimeRes};
use ar_placement::{AppConfig, ArPlacementPlugin, ArSessionState};
use common::{run_until, state};

fn simulated_app(cfg: AppConfig) -> (App, SimulatedViewer) {
    let viewer = SimulatedViewer::new(ViewerRig::from_config(&cfg.simulation.viewer));
    let runtime = SimulatedRuntime::new(cfg.simulation.clone(), viewer.clone());
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(cfg)
        .insert_resource(XrRuntimeRes::new(runtime))
        .insert_resource(viewer.clone())
        .add_plugins(ArPlacementPlugin);
    (app, viewer)
}

fn auto_start() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.session.auto_start = true;
    cfg
}

#[test]
fn floor_shows_reticle_in_front_of_viewer() {
    let (mut app, _viewer) = simulated_app(auto_start());
    run_until(&mut app, 40, |a| a.world().resource::<ArSessionContext>().reticle().visible);
    let ctx = app.world().resource::<ArSessionContext>();
    assert_eq!(ctx.hit_test().phase(), ChannelPhase::Ready);
    let p = ctx.reticle().pose.position();
    assert!(p.y.abs() < 1e-4, "reticle should sit on the floor: {p:?}");
    assert!(p.z < 0.0, "reticle should be ahead of the viewer: {p:?}");
    assert_eq!(state(&app), ArSessionState::Active);
    assert!(app.world().resource::<CurrentXrFrame>().0.as_ref().is_some_and(|f| f.viewer.is_some()));
}

#[test]
fn looking_at_the_sky_hides_reticle() {
    let (mut app, viewer) = simulated_app(auto_start());
    run_until(&mut app, 40, |a| a.world().resource::<ArSessionContext>().reticle().visible);
    viewer.lock().pitch = 0.6;
    app.update();
    assert!(!app.world().resource::<ArSessionContext>().reticle().visible);
}

#[test]
fn forced_source_failure_keeps_reticle_hidden() {
    let mut cfg = auto_start();
    cfg.simulation.fail_hit_test_source = true;
    let (mut app, _viewer) = simulated_app(cfg);
    run_until(&mut app, 40, |a| {
        a.world().resource::<ArSessionContext>().hit_test().phase() == ChannelPhase::Failed
    });
    for _ in 0..10 {
        app.update();
    }
    let ctx = app.world().resource::<ArSessionContext>();
    assert!(!ctx.reticle().visible);
    assert_eq!(ctx.hit_test().requests_issued(), 1);
}
