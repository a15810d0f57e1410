//! The coercion layer.
//!
//! Every operator and by-name method call on [`Value`](crate::Value)s goes
//! through here. Each entry point decides, per pair of operand kinds, whether
//! to delegate to the typed implementation or raise `TypeError`.

pub mod arithmetic;
pub mod comparison;
pub mod containers;
pub mod method_dispatch;

pub use arithmetic::{BinaryOp, UnaryOp, binary_op, divmod, pow_mod, unary_op};
pub use comparison::{CompareOp, compare, py_eq, py_ne, values_equal};
pub use containers::{contains, get_item, iterate, len};
pub use method_dispatch::{call_method, call_method_mut};
