pub mod pattern;
pub mod highlighter;

pub use pattern::*;
pub use highlighter::*;
