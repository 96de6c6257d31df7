pub mod attributes;
pub mod fixtures;

pub use attributes::*;
pub use fixtures::*;
