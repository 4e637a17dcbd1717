//! Hit-test channel, reticle snapshot, placer and the per-tick driver.

pub mod context;
pub mod frame_loop;
pub mod hit_test;
pub mod placer;
pub mod reticle;

pub use context::{ActiveSession, ArSessionContext};
pub use hit_test::{ChannelPhase, HitTestChannel};
pub use placer::ObjectPlacer;
pub use reticle::PlacementReticle;
