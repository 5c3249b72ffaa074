pub mod domain;
pub mod statistics;

pub use domain::*;
pub use statistics::*;
