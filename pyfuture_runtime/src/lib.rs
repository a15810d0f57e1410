//! # pyfuture Runtime
//!
//! Python 3 value semantics for text, binary and numeric types.
//!
//! - **Types**: [`NewStr`], [`NewBytes`], [`NewInt`], [`NewRange`],
//!   [`NewList`] and [`NewDict`] behave like their Python 3 counterparts
//! - **Values**: [`Value`] is the closed set of variants the coercion layer
//!   works with, including the host's conflated `LegacyBytes`
//! - **Coercion**: [`ops`] decides which cross-type operations raise
//!   `TypeError` and which succeed
//! - **Rounding**: [`round()`] implements banker's rounding with per-type hooks
//!
//! ```
//! use pyfuture_runtime::{NewBytes, NewStr, Value};
//! use pyfuture_runtime::ops::{BinaryOp, binary_op};
//!
//! let text = Value::from(NewStr::from("abc"));
//! let data = Value::from(NewBytes::from(&b"abc"[..]));
//! assert!(binary_op(BinaryOp::Add, &text, &data).is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod ops;
pub mod round;
pub mod types;
pub mod value;

pub use pyfuture_core::{FutureError, FutureResult, register_surrogateescape};
pub use round::{Round, round};
pub use types::{
    ListSubtype, NewBytes, NewDict, NewInt, NewList, NewRange, NewStr, Slice, TranslationTable,
};
pub use value::{TypeFlags, Value};
