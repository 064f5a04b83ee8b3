mod participant;
mod room_registry;

pub use participant::*;
pub use room_registry::*;
