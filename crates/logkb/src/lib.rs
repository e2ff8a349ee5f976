//! Knowledge base contract consumed by the grounders.
//!
//! A backend answers two kinds of requests:
//!
//! - [`LogKb::ask`]: every distinct tuple binding the selectors that satisfies
//!   a formula, optionally followed by the value of a coefficient expression
//! - [`LogKb::ask_fact`]: the scalar value of one ground numeric atom
//!
//! Concrete engines (Datalog, Prolog, relational databases) live outside this
//! workspace; [`FactBase`] is the in-memory reference backend.

pub mod error;
pub mod factbase;

pub use error::KbError;
pub use factbase::FactBase;

use ir::{Atom, Constant, Expr, Formula, Interpretation, IrError, SubSymbol};

/// One answer row.
pub type Tuple = Vec<Constant>;

/// Distinct answer rows in backend order.
///
/// `vec![]` is unsatisfiable; `vec![vec![]]` is satisfiable without bindings.
pub type Answers = Vec<Tuple>;

/// The two-operation knowledge base interface.
pub trait LogKb {
    /// Answers `formula`, projecting onto `selectors`.
    ///
    /// With a coefficient, each row carries the coefficient's value under that
    /// row's bindings as a trailing [`Constant::Real`].
    fn ask(
        &self,
        selectors: &[SubSymbol],
        formula: &Formula,
        coefficient: Option<&Expr>,
    ) -> Result<Answers, KbError>;

    /// The value of a ground numeric atom, `None` when it is undefined.
    fn ask_fact(&self, atom: &Atom) -> Result<Option<f64>, KbError>;
}

impl<K: LogKb + ?Sized> LogKb for &K {
    fn ask(
        &self,
        selectors: &[SubSymbol],
        formula: &Formula,
        coefficient: Option<&Expr>,
    ) -> Result<Answers, KbError> {
        (**self).ask(selectors, formula, coefficient)
    }

    fn ask_fact(&self, atom: &Atom) -> Result<Option<f64>, KbError> {
        (**self).ask_fact(atom)
    }
}

/// Views a knowledge base as an [`Interpretation`] for expression evaluation.
pub struct KbInterpretation<'a, K: ?Sized>(pub &'a K);

impl<K: LogKb + ?Sized> Interpretation for KbInterpretation<'_, K> {
    fn value(&self, atom: &Atom) -> Result<f64, IrError> {
        self.0
            .ask_fact(atom)
            .map_err(|e| IrError::Resolution(e.to_string()))?
            .ok_or_else(|| IrError::Undefined(atom.to_string()))
    }

    fn answers(
        &self,
        symbols: &[SubSymbol],
        formula: &Formula,
    ) -> Result<Vec<Vec<Constant>>, IrError> {
        self.0
            .ask(symbols, formula, None)
            .map_err(|e| IrError::Resolution(e.to_string()))
    }
}
