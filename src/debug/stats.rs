#[cfg(feature = "debug")]
use bevy::prelude::*;

#[cfg(feature = "debug")]
use crate::app::state::ArSessionState;
#[cfg(feature = "debug")]
use crate::core::components::PlacedObject;
#[cfg(feature = "debug")]
use crate::core::config::AppConfig;
#[cfg(feature = "debug")]
use crate::placement::context::ArSessionContext;
#[cfg(feature = "debug")]
use crate::placement::hit_test::ChannelPhase;
#[cfg(feature = "debug")]
use crate::xr::CurrentXrFrame;

#[cfg(feature = "debug")]
#[derive(Resource, Debug)]
pub struct DebugState {
    pub time_accum: f32,
    pub frame_counter: u64,
    /// Ticks that carried a tracking context.
    pub tracked_frames: u64,
    pub last_phase: Option<ChannelPhase>,
}

#[cfg(feature = "debug")]
impl Default for DebugState {
    fn default() -> Self {
        Self { time_accum: 0.0, frame_counter: 0, tracked_frames: 0, last_phase: None }
    }
}

#[cfg(feature = "debug")]
#[derive(Resource, Default, Debug, Clone)]
pub struct DebugStats {
    pub fps: f32,
    pub session: Option<ArSessionState>,
    pub phase: Option<ChannelPhase>,
    pub reticle_visible: bool,
    pub placed: usize,
    pub log_interval: f32,
}

#[cfg(feature = "debug")]
#[allow(clippy::too_many_arguments)]
pub fn debug_stats_collect_system(
    time: Res<Time>,
    cfg: Res<AppConfig>,
    mut state: ResMut<DebugState>,
    mut stats: ResMut<DebugStats>,
    session_state: Option<Res<State<ArSessionState>>>,
    ctx: Res<ArSessionContext>,
    frame: Res<CurrentXrFrame>,
    q_placed: Query<(), With<PlacedObject>>,
) {
    state.frame_counter += 1;
    if frame.0.is_some() {
        state.tracked_frames += 1;
    }
    let dt = time.delta_secs().max(1e-6);
    let inst_fps = 1.0 / dt;
    stats.fps = if stats.fps == 0.0 { inst_fps } else { stats.fps * 0.9 + inst_fps * 0.1 };
    stats.session = session_state.map(|s| *s.get());
    let phase = ctx.hit_test().phase();
    if state.last_phase != Some(phase) {
        debug!(target: "hit_test", "channel phase {:?} -> {:?}", state.last_phase, phase);
        state.last_phase = Some(phase);
    }
    stats.phase = Some(phase);
    stats.reticle_visible = ctx.reticle().visible;
    stats.placed = q_placed.iter().count();
    stats.log_interval = cfg.debug.log_interval;
}
