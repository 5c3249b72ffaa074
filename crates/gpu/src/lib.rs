pub mod renderer;
pub mod triggers;

pub use renderer::*;
pub use triggers::*;
