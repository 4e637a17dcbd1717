use bevy::prelude::*;

use crate::core::config::AppConfig;
use crate::placement::context::ArSessionContext;
use crate::xr::XrRuntimeRes;

/// Countdown to the scripted exit.
#[derive(Resource, Deref, DerefMut)]
struct AutoCloseTimer(Timer);

/// Exits after `window.autoClose` seconds (0 disables). A live session is ended
/// with the runtime first so smoke runs leave nothing open.
pub struct AutoClosePlugin;

impl Plugin for AutoClosePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, arm_auto_close)
            .add_systems(Update, close_when_due);
    }
}

fn arm_auto_close(mut commands: Commands, cfg: Res<AppConfig>) {
    let secs = cfg.window.auto_close;
    if secs > 0.0 {
        info!(target: "session", seconds = secs, "auto-close armed");
        commands.insert_resource(AutoCloseTimer(Timer::from_seconds(secs, TimerMode::Once)));
    }
}

fn close_when_due(
    time: Res<Time>,
    timer: Option<ResMut<AutoCloseTimer>>,
    ctx: Res<ArSessionContext>,
    mut runtime: ResMut<XrRuntimeRes>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(mut timer) = timer else {
        return;
    };
    if !timer.tick(time.delta()).just_finished() {
        return;
    }
    if let Some(active) = ctx.session() {
        info!(target: "session", "auto-close: ending session {}", active.session.id);
        runtime.end_session(&active.session);
    }
    info!(target: "session", "auto-close: requesting app exit");
    exit.write(AppExit::Success);
}
