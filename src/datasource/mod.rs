pub mod board_config;
pub mod file_path;
pub mod freq_catalog;
pub mod node_monitor;
pub mod system_state;
