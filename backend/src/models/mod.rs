pub mod interval;
pub mod product;
pub mod time;

pub use interval::*;
pub use product::*;
