pub mod attribute_cache;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use attribute_cache::*;
pub use memory::*;
pub use postgres::*;
pub use traits::*;
