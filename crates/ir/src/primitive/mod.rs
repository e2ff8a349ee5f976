//! Primitive values of relational linear programs.
//!
//! - [`Constant`]: a concrete value bound to a logical variable or stored in a fact
//! - [`SubSymbol`]: a named logical variable used inside queries and expression templates

pub mod constant;
pub mod symbol;

pub use constant::Constant;
pub use symbol::{sub_symbols, SubSymbol};
