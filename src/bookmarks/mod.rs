pub mod store;
pub mod sidebar;

pub use store::*;
pub use sidebar::*;
