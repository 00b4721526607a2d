pub mod config_io;
pub mod journal;
pub mod lock;
pub mod state;
pub mod watcher;
