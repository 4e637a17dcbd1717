pub mod auto_close;
pub mod capability;
pub mod config_hot_reload;
pub mod lifecycle;
