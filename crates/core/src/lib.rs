//! qbind core types: the message tree a decode builds, and the values it holds.

#![forbid(unsafe_code)]

mod message;
mod value;

pub use message::{FieldValue, Message};
pub use value::{InvalidMapKey, MapKey, Value, WellKnown};

pub mod prelude {
    pub use super::{FieldValue, MapKey, Message, Value, WellKnown};
}
