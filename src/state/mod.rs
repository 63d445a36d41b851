//! Control state engine

mod control;
mod controls;
mod events;
mod form_state;

pub use control::*;
pub use controls::*;
pub use events::*;
pub use form_state::*;
