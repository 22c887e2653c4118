pub mod file_operate;
pub mod inotify;
pub mod log_monitor;
pub mod logger;
pub mod time;
