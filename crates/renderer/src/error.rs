use thiserror::Error;

/// Failures while rendering or executing SQL.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Render error: symbol '{0}' is not bound by a positive atom")]
    UnboundSymbol(String),
    #[error("Render error: coefficient term '{0}' has no SQL form")]
    UnsupportedCoefficient(String),
    #[error("Render error: table '{table}' has no column {index}")]
    MissingColumn { table: String, index: usize },
    #[error("Render error: fact lookup needs a ground atom, got '{0}'")]
    NotGround(String),
    #[error("SQL error: {0}")]
    Backend(String),
}
