//! Python 3 value types.
//!
//! Contains the typed implementations the coercion layer delegates to.

pub mod bytes;
pub mod dict;
pub mod int;
pub mod list;
pub mod range;
pub(crate) mod search;
pub mod slice;
pub mod string;

// Re-export commonly used types
pub use bytes::NewBytes;
pub use dict::{HashKey, NewDict};
pub use int::{ByteOrder, NewInt};
pub use list::{ListSubtype, NewList};
pub use range::{NewRange, RangeIter};
pub use slice::{Slice, SliceIndices, normalize_index};
pub use string::{NewStr, TranslationTable};
