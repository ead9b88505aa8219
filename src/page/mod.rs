pub mod events;
pub mod engine;

pub use events::*;
pub use engine::*;
