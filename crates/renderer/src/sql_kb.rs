//! A [`LogKb`] backed by any SQL executor.

use crate::compiler::QueryCompiler;
use crate::error::RenderError;
use crate::schema::SchemaSource;
use ir::{Atom, Binding, Constant, Expr, Formula, SubSymbol};
use logkb::{Answers, KbError, KbInterpretation, LogKb, Tuple};
use std::cell::RefCell;
use tracing::trace;

/// Runs one SQL statement and returns its rows.
pub trait SqlExecutor {
    fn execute(&self, sql: &str) -> Result<Vec<Tuple>, RenderError>;
}

impl<E: SqlExecutor + ?Sized> SqlExecutor for &E {
    fn execute(&self, sql: &str) -> Result<Vec<Tuple>, RenderError> {
        (**self).execute(sql)
    }
}

impl From<RenderError> for KbError {
    fn from(e: RenderError) -> Self {
        KbError::Backend(e.to_string())
    }
}

/// Answers knowledge base requests by rendering them to SQL.
pub struct SqlLogKb<E, S> {
    executor: E,
    compiler: RefCell<QueryCompiler<S>>,
}

impl<E: SqlExecutor, S: SchemaSource> SqlLogKb<E, S> {
    #[must_use]
    pub fn new(executor: E, schema: S) -> Self {
        Self {
            executor,
            compiler: RefCell::new(QueryCompiler::new(schema)),
        }
    }

    #[must_use]
    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: SqlExecutor, S: SchemaSource> LogKb for SqlLogKb<E, S> {
    fn ask(
        &self,
        selectors: &[SubSymbol],
        formula: &Formula,
        coefficient: Option<&Expr>,
    ) -> Result<Answers, KbError> {
        match formula.simplify() {
            Formula::False => return Ok(Vec::new()),
            Formula::True => {
                if let Some(s) = selectors.first() {
                    return Err(KbError::UnboundSelector(s.to_string()));
                }
                let mut row = Vec::new();
                if let Some(expr) = coefficient {
                    let value = expr.evaluate(&KbInterpretation(self), &Binding::new())?;
                    row.push(Constant::Real(value));
                }
                return Ok(vec![row]);
            }
            _ => {}
        }

        let Some(sql) = self
            .compiler
            .borrow_mut()
            .compile(selectors, formula, coefficient)?
        else {
            return Ok(Vec::new());
        };
        let width = selectors.len() + usize::from(coefficient.is_some());
        let rows = self.executor.execute(&sql)?;
        trace!("{sql} -> {} row(s)", rows.len());

        if width == 0 {
            return Ok(if rows.is_empty() { Vec::new() } else { vec![Vec::new()] });
        }
        rows.into_iter()
            .map(|mut row| {
                if row.len() < width {
                    return Err(KbError::Backend(format!(
                        "expected {width} column(s), got {}",
                        row.len()
                    )));
                }
                row.truncate(width);
                if coefficient.is_some() {
                    let cell = row.pop().and_then(|c| c.as_f64()).ok_or_else(|| {
                        KbError::Backend("coefficient column is not numeric".into())
                    })?;
                    row.push(Constant::Real(cell));
                }
                Ok(row)
            })
            .collect()
    }

    fn ask_fact(&self, atom: &Atom) -> Result<Option<f64>, KbError> {
        if atom.ground_arguments().is_none() {
            return Err(KbError::NotGround(atom.to_string()));
        }
        let sql = self.compiler.borrow_mut().fact_query(atom)?;
        let rows = self.executor.execute(&sql)?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => row
                .first()
                .and_then(Constant::as_f64)
                .map(Some)
                .ok_or_else(|| KbError::NonNumeric(atom.to_string())),
            _ => Err(KbError::Inconsistent {
                atom: atom.to_string(),
                count: rows.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InformationSchema, PositionalSchema};
    use ir::{parse_formula, PredicateTemplate, Term};

    /// Records statements and replays canned rows.
    struct Recorder {
        statements: RefCell<Vec<String>>,
        replies: RefCell<Vec<Vec<Tuple>>>,
    }

    impl Recorder {
        fn new(replies: Vec<Vec<Tuple>>) -> Self {
            Self {
                statements: RefCell::new(Vec::new()),
                replies: RefCell::new(replies.into_iter().rev().collect()),
            }
        }
    }

    impl SqlExecutor for Recorder {
        fn execute(&self, sql: &str) -> Result<Vec<Tuple>, RenderError> {
            self.statements.borrow_mut().push(sql.to_string());
            Ok(self.replies.borrow_mut().pop().unwrap_or_default())
        }
    }

    #[test]
    fn ask_renders_and_converts_coefficients() {
        let recorder = Recorder::new(vec![vec![
            vec![Constant::text("a"), Constant::Integer(4)],
            vec![Constant::text("b"), Constant::Real(2.5)],
        ]]);
        let kb = SqlLogKb::new(&recorder, PositionalSchema);
        let f = parse_formula("cap(X, Y, V)").unwrap();
        let coef = Expr::symbol("V");
        let rows = kb.ask(&[SubSymbol::new("X")], &f, Some(&coef)).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Constant::text("a"), Constant::Real(4.0)],
                vec![Constant::text("b"), Constant::Real(2.5)],
            ]
        );
        assert_eq!(
            recorder.statements.borrow()[0],
            "SELECT DISTINCT a1.c1 AS X, a1.c3 FROM cap AS a1"
        );
    }

    #[test]
    fn trivial_formulas_do_not_query() {
        let recorder = Recorder::new(Vec::new());
        let kb = SqlLogKb::new(&recorder, PositionalSchema);
        let coef = Expr::constant(-3.0);
        assert_eq!(
            kb.ask(&[], &Formula::True, Some(&coef)).unwrap(),
            vec![vec![Constant::Real(-3.0)]]
        );
        assert!(kb.ask(&[], &Formula::False, None).unwrap().is_empty());
        assert!(recorder.statements.borrow().is_empty());
    }

    #[test]
    fn boolean_answers() {
        let recorder = Recorder::new(vec![vec![vec![Constant::Integer(1)]], Vec::new()]);
        let kb = SqlLogKb::new(&recorder, PositionalSchema);
        let f = parse_formula("edge(a, b)").unwrap();
        assert_eq!(kb.ask(&[], &f, None).unwrap(), vec![Vec::<Constant>::new()]);
        assert!(kb.ask(&[], &f, None).unwrap().is_empty());
    }

    #[test]
    fn fact_lookup_outcomes() {
        let cap = PredicateTemplate::numeric("cap", 1);
        let atom = Atom::new(&cap, vec![Term::from("a")]).unwrap();
        let recorder = Recorder::new(vec![
            vec![vec![Constant::Integer(7)]],
            Vec::new(),
            vec![vec![Constant::Integer(1)], vec![Constant::Integer(2)]],
        ]);
        let kb = SqlLogKb::new(&recorder, PositionalSchema);
        assert_eq!(kb.ask_fact(&atom).unwrap(), Some(7.0));
        assert_eq!(kb.ask_fact(&atom).unwrap(), None);
        assert!(matches!(kb.ask_fact(&atom), Err(KbError::Inconsistent { count: 2, .. })));
        assert_eq!(
            recorder.statements.borrow()[0],
            "SELECT c2 FROM cap WHERE c1 = 'a'"
        );
    }

    #[test]
    fn information_schema_names_columns() {
        let recorder = Recorder::new(vec![
            vec![vec![Constant::text("src")], vec![Constant::text("dst")]],
            Vec::new(),
        ]);
        let kb = SqlLogKb::new(&recorder, InformationSchema(&recorder));
        let f = parse_formula("edge(X, Y)").unwrap();
        kb.ask(&[SubSymbol::new("Y")], &f, None).unwrap();
        let statements = recorder.statements.borrow();
        assert!(statements[0].contains("information_schema.columns WHERE table_name = 'edge'"));
        assert_eq!(statements[1], "SELECT DISTINCT a1.dst AS Y FROM edge AS a1");
    }
}
