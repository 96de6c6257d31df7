pub mod attribute;
pub mod common;
pub mod spec;

pub use attribute::*;
pub use common::*;
pub use spec::*;
