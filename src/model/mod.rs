pub mod coordinator;
pub mod dispatch;
pub mod governor;
pub mod hint;
pub mod interactive;
pub mod plugin;
