pub mod board;
pub mod card;
pub mod config;
pub mod lane;
pub mod workspace;

pub use board::*;
pub use card::*;
pub use config::*;
pub use lane::*;
pub use workspace::*;
