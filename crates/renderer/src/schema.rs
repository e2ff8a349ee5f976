//! Column name discovery.

use crate::error::RenderError;
use crate::SqlExecutor;
use ir::Constant;

/// Widest table the positional schema names.
pub const MAX_COLUMNS: usize = 254;

/// Supplies the ordered column names of a table.
pub trait SchemaSource {
    fn column_names(&self, table: &str) -> Result<Vec<String>, RenderError>;
}

/// Names every table's columns `c1, c2, ...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalSchema;

impl SchemaSource for PositionalSchema {
    fn column_names(&self, _table: &str) -> Result<Vec<String>, RenderError> {
        Ok((1..=MAX_COLUMNS).map(|i| format!("c{i}")).collect())
    }
}

/// Reads column names from `information_schema.columns` through an executor.
#[derive(Debug, Clone)]
pub struct InformationSchema<E>(pub E);

impl<E: SqlExecutor> SchemaSource for InformationSchema<E> {
    fn column_names(&self, table: &str) -> Result<Vec<String>, RenderError> {
        let sql = format!(
            "SELECT column_name FROM information_schema.columns WHERE table_name = '{}' \
             ORDER BY ordinal_position ASC",
            table.to_lowercase().replace('\'', "''")
        );
        self.0
            .execute(&sql)?
            .into_iter()
            .map(|row| match row.into_iter().next() {
                Some(Constant::Text(name)) => Ok(name),
                other => Err(RenderError::Backend(format!(
                    "unexpected column name cell {other:?} for table '{table}'"
                ))),
            })
            .collect()
    }
}
