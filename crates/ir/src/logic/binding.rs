//! Variable bindings produced by knowledge base answers.

use crate::primitive::{Constant, SubSymbol};
use std::collections::HashMap;

/// A capture-avoiding rename of bound sub-symbols.
pub type Renaming = HashMap<SubSymbol, SubSymbol>;

/// A partial assignment of sub-symbols to constants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: HashMap<SubSymbol, Constant>,
}

impl Binding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `symbols[i]` to `tuple[i]`; extra cells on either side are ignored.
    #[must_use]
    pub fn from_answer(symbols: &[SubSymbol], tuple: &[Constant]) -> Self {
        let mut binding = Self::new();
        binding.extend(symbols, tuple);
        binding
    }

    pub fn bind(&mut self, symbol: SubSymbol, value: Constant) {
        self.values.insert(symbol, value);
    }

    pub fn extend(&mut self, symbols: &[SubSymbol], tuple: &[Constant]) {
        for (symbol, value) in symbols.iter().zip(tuple) {
            self.values.insert(symbol.clone(), value.clone());
        }
    }

    /// A copy of `self` extended with an answer tuple.
    #[must_use]
    pub fn extended(&self, symbols: &[SubSymbol], tuple: &[Constant]) -> Self {
        let mut binding = self.clone();
        binding.extend(symbols, tuple);
        binding
    }

    /// A copy of `self` that leaves `symbols` unbound.
    #[must_use]
    pub fn without(&self, symbols: &[SubSymbol]) -> Self {
        let mut binding = self.clone();
        binding.values.retain(|s, _| !symbols.contains(s));
        binding
    }

    #[must_use]
    pub fn get(&self, symbol: &SubSymbol) -> Option<&Constant> {
        self.values.get(symbol)
    }

    #[must_use]
    pub fn contains(&self, symbol: &SubSymbol) -> bool {
        self.values.contains_key(symbol)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
