//! Systems - logic that runs every tick over camp components

mod events;
mod reception;
mod vitals;

pub use events::*;
pub use reception::*;
pub use vitals::*;
