mod config;
mod pdr;
mod qer;

pub use config::*;
pub use pdr::*;
pub use qer::*;
