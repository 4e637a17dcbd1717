//! AR runtime seam: typed handles, promise-like requests, the runtime trait and
//! a desktop simulation of it.

pub mod error;
pub mod manual;
pub mod pending;
pub mod runtime;
pub mod simulated;
pub mod types;

pub use error::XrError;
pub use manual::{ManualRuntime, RequestCounts};
pub use pending::{pending, Pending, Resolver, XrResult};
pub use runtime::{CurrentXrFrame, XrRuntime, XrRuntimeRes};
pub use simulated::{SimulatedRuntime, SimulatedViewer, SimulatedViewerPlugin, ViewerRig};
pub use types::{
    FeatureName, FeatureSet, Hit, HitTestSource, HitTestSourceId, Pose, ReferenceSpace,
    ReferenceSpaceKind, SessionId, SessionInit, SessionMode, SpaceId, XrEvent, XrFrame, XrSession,
};
