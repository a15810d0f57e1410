//! # pyfuture Core
//!
//! Foundations shared by the pyfuture value types.
//!
//! - **Error Handling**: one error enum naming the Python 3 exception class
//!   of every failure
//! - **Codecs**: utf-8, utf-16, ascii, latin-1 and cp1251 over code-point
//!   text, with a process-wide error handler registry
//! - **Surrogate Escapes**: lossless byte/text round trips for undecodable input

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod error;

pub use codec::{Encoding, FilenameCodec, register_surrogateescape};
pub use error::{FutureError, FutureResult};

/// pyfuture version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Python language version whose semantics the value types follow.
pub const PYTHON_VERSION: (u8, u8, u8) = (3, 12, 0);
