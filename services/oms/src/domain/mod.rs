//! Order and event entities, packaging kinds, and the validation primitives
//! that sit close enough to the data to need no I/O.

mod event;
mod order;
mod packaging;

pub use event::{Event, EventPayload, EventType};
pub use order::{Order, OrderState};
pub use packaging::Packaging;
