mod encoder;
mod frame;
mod tick_loop;

pub use encoder::*;
pub use frame::*;
pub use tick_loop::*;
