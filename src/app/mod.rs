pub mod plugin;
pub mod state;
