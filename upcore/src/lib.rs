mod data;
mod userplane;

pub use data::*;
pub use userplane::*;

// Readers pin an epoch guard for the duration of one traversal; entries they
// hold stay valid until the guard drops.
pub use crossbeam_epoch::{Guard, pin};
