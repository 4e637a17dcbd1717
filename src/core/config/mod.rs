pub mod config;

pub use config::{
    AppConfig, CameraConfig, DebugConfig, LightingConfig, ModelConfig, PlacementConfig,
    ReticleConfig, SessionConfig, SimPlaneConfig, SimulationConfig, ViewerRigConfig, WindowConfig,
    parse_features,
};
