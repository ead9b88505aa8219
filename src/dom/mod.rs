pub mod node;
pub mod document;

pub use node::*;
pub use document::*;
