pub mod accessor;
pub mod channel;
pub mod config;
pub mod data;
pub mod icon;
pub mod layer;
pub mod scale;

pub use layer::*;
