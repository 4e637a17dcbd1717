pub mod app;
pub mod core;
pub mod debug;
pub mod interaction;
pub mod placement;
pub mod rendering;
pub mod xr;

// Curated re-exports
pub use app::plugin::ArPlacementPlugin;
pub use app::state::ArSessionState;
pub use core::config::{AppConfig, WindowConfig};
pub use core::components::{ArCamera, PlacedObject, Reticle};
pub use rendering::ArRenderingPlugin;
