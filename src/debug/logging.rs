#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use super::stats::{DebugState, DebugStats};

#[cfg(feature = "debug")]
pub fn debug_logging_system(time: Res<Time>, mut state: ResMut<DebugState>, stats: Res<DebugStats>) {
    state.time_accum += time.delta_secs();
    if state.time_accum >= stats.log_interval.max(0.1) {
        state.time_accum = 0.0;
        info!("AR frame={} tracked={} t={:.3}s fps={:.1} session={:?} channel={:?} reticle={} placed={}",
            state.frame_counter,
            state.tracked_frames,
            time.elapsed_secs(),
            stats.fps,
            stats.session,
            stats.phase,
            stats.reticle_visible,
            stats.placed);
    }
}
