pub mod args;
pub mod logging;

pub use args::*;
pub use logging::*;
