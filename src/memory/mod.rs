pub mod types;
pub mod store;

pub use types::*;
pub use store::*;
