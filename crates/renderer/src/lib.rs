//! SQL rendering of knowledge base queries.
//!
//! [`QueryCompiler`] turns `(selectors, formula, coefficient)` into a `UNION`
//! of `SELECT DISTINCT` clauses; [`SqlLogKb`] uses it to answer the
//! [`logkb::LogKb`] contract through any [`SqlExecutor`].

pub mod compiler;
pub mod error;
pub mod schema;
pub mod sql_kb;

pub use compiler::{sql_literal, QueryCompiler};
pub use error::RenderError;
pub use schema::{InformationSchema, PositionalSchema, SchemaSource, MAX_COLUMNS};
pub use sql_kb::{SqlExecutor, SqlLogKb};
