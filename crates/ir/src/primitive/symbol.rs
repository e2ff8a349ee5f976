//! Logical variables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named logical variable.
///
/// Sub-symbols never carry a value themselves; they are bound by knowledge
/// base answers. Two sub-symbols are the same variable iff their names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubSymbol {
    name: String,
}

impl SubSymbol {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Convenience constructor for several sub-symbols at once.
#[must_use]
pub fn sub_symbols<const N: usize>(names: [&str; N]) -> [SubSymbol; N] {
    names.map(SubSymbol::new)
}

impl fmt::Display for SubSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
