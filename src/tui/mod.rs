pub mod app;
pub mod drag;
pub mod input;
pub mod layout;
pub mod render;
pub mod theme;

pub use app::run;
