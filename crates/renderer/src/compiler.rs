//! Renders DNF queries to SQL.
//!
//! Each conjunction becomes one `SELECT DISTINCT` clause and the clauses are
//! joined with `UNION`. Within a clause:
//!
//! - every positive atom is a table reference `name AS aK`
//! - columns sharing a symbol are joined by equality with the symbol's first column
//! - constant arguments filter by equality
//! - comparisons render against the symbol's first column
//! - negated atoms become `NOT EXISTS` sub-selects with aliases `nK`
//!
//! # Example
//! ```rust
//! use ir::{parse_formula, SubSymbol};
//! use renderer::{PositionalSchema, QueryCompiler};
//! let mut compiler = QueryCompiler::new(PositionalSchema);
//! let f = parse_formula("edge(X, Y) & ~source(X)").unwrap();
//! let sql = compiler.compile(&[SubSymbol::new("Y")], &f, None).unwrap().unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT DISTINCT a1.c2 AS Y FROM edge AS a1 \
//!      WHERE NOT EXISTS (SELECT 1 FROM source AS n1 WHERE n1.c1 = a1.c1)"
//! );
//! ```

use crate::error::RenderError;
use crate::schema::SchemaSource;
use ir::{Atom, Comparison, Constant, Expr, Formula, Literal, SubSymbol, Term};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::debug;

/// SQL literal for a constant; text is single-quoted with quotes doubled.
#[must_use]
pub fn sql_literal(value: &Constant) -> String {
    match value {
        Constant::Integer(v) => v.to_string(),
        Constant::Real(v) => format!("{v:?}"),
        Constant::Text(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

/// Compiles queries against one schema, caching column names per table.
#[derive(Debug)]
pub struct QueryCompiler<S> {
    schema: S,
    columns: HashMap<String, Vec<String>>,
}

impl<S: SchemaSource> QueryCompiler<S> {
    #[must_use]
    pub fn new(schema: S) -> Self {
        Self {
            schema,
            columns: HashMap::new(),
        }
    }

    /// Renders the query; `None` when the formula is unsatisfiable.
    ///
    /// Without selectors or coefficient, the clause selects the constant `1`.
    pub fn compile(
        &mut self,
        selectors: &[SubSymbol],
        formula: &Formula,
        coefficient: Option<&Expr>,
    ) -> Result<Option<String>, RenderError> {
        let dnf = formula.to_dnf();
        if dnf.is_empty() {
            return Ok(None);
        }
        let clauses = dnf
            .iter()
            .map(|conjunction| {
                let clause = Clause::build(self, conjunction)?;
                clause.render(selectors, coefficient)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let sql = clauses.join(" UNION ");
        debug!("rendered {formula} as: {sql}");
        Ok(Some(sql))
    }

    /// `SELECT <value column> FROM t WHERE c1 = .. AND ..` for a ground numeric atom.
    pub fn fact_query(&mut self, atom: &Atom) -> Result<String, RenderError> {
        let args = atom
            .ground_arguments()
            .ok_or_else(|| RenderError::NotGround(atom.to_string()))?;
        let value_column = self.column(atom.name(), args.len())?;
        let conditions = args
            .iter()
            .enumerate()
            .map(|(i, value)| Ok(format!("{} = {}", self.column(atom.name(), i)?, sql_literal(value))))
            .collect::<Result<Vec<_>, RenderError>>()?;
        let mut sql = format!("SELECT {value_column} FROM {}", atom.name());
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        Ok(sql)
    }

    /// Name of column `index` (zero-based) of `table`.
    fn column(&mut self, table: &str, index: usize) -> Result<String, RenderError> {
        if !self.columns.contains_key(table) {
            let names = self.schema.column_names(table)?;
            self.columns.insert(table.to_string(), names);
        }
        self.columns
            .get(table)
            .and_then(|names| names.get(index))
            .cloned()
            .ok_or_else(|| RenderError::MissingColumn {
                table: table.to_string(),
                index,
            })
    }
}

/// One conjunction being rendered.
struct Clause {
    from: Vec<String>,
    /// Symbol columns in first-seen order.
    symbols: Vec<(SubSymbol, Vec<String>)>,
    const_conditions: Vec<String>,
    comparisons: Vec<Comparison>,
    anti_joins: Vec<(String, Vec<(String, Term)>)>,
}

impl Clause {
    fn build<S: SchemaSource>(
        compiler: &mut QueryCompiler<S>,
        conjunction: &[Literal],
    ) -> Result<Self, RenderError> {
        let mut clause = Self {
            from: Vec::new(),
            symbols: Vec::new(),
            const_conditions: Vec::new(),
            comparisons: Vec::new(),
            anti_joins: Vec::new(),
        };
        for literal in conjunction {
            match literal {
                Literal::Positive(atom) => {
                    let alias = format!("a{}", clause.from.len() + 1);
                    clause.from.push(format!("{} AS {alias}", atom.name()));
                    for (i, arg) in atom.arguments().iter().enumerate() {
                        let column = format!("{alias}.{}", compiler.column(atom.name(), i)?);
                        match arg {
                            Term::Var(v) => clause.bind(v, column),
                            Term::Const(c) => clause
                                .const_conditions
                                .push(format!("{column} = {}", sql_literal(c))),
                        }
                    }
                }
                Literal::Negative(atom) => {
                    let alias = format!("n{}", clause.anti_joins.len() + 1);
                    let columns = atom
                        .arguments()
                        .iter()
                        .enumerate()
                        .map(|(i, arg)| {
                            let column = format!("{alias}.{}", compiler.column(atom.name(), i)?);
                            Ok((column, arg.clone()))
                        })
                        .collect::<Result<Vec<_>, RenderError>>()?;
                    clause
                        .anti_joins
                        .push((format!("{} AS {alias}", atom.name()), columns));
                }
                Literal::Compare(c) => clause.comparisons.push(c.clone()),
            }
        }
        Ok(clause)
    }

    fn bind(&mut self, symbol: &SubSymbol, column: String) {
        match self.symbols.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, columns)) => columns.push(column),
            None => self.symbols.push((symbol.clone(), vec![column])),
        }
    }

    fn first_column(&self, symbol: &SubSymbol) -> Result<&str, RenderError> {
        self.symbols
            .iter()
            .find(|(s, _)| s == symbol)
            .and_then(|(_, columns)| columns.first())
            .map(String::as_str)
            .ok_or_else(|| RenderError::UnboundSymbol(symbol.to_string()))
    }

    fn side(&self, term: &Term) -> Result<String, RenderError> {
        match term {
            Term::Var(v) => self.first_column(v).map(str::to_string),
            Term::Const(c) => Ok(sql_literal(c)),
        }
    }

    fn coefficient(&self, expr: &Expr) -> Result<String, RenderError> {
        match expr {
            Expr::Constant(v) => Ok(v.to_string()),
            Expr::Symbol(s) => self.first_column(s).map(str::to_string),
            Expr::Add(terms) => Ok(format!(
                "({})",
                terms
                    .iter()
                    .map(|t| self.coefficient(t))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(" + ")
            )),
            Expr::Mul(factors) => Ok(factors
                .iter()
                .map(|f| self.coefficient(f))
                .collect::<Result<Vec<_>, _>>()?
                .join(" * ")),
            Expr::Atom(_) | Expr::Sum(_) => {
                Err(RenderError::UnsupportedCoefficient(expr.to_string()))
            }
        }
    }

    fn render(&self, selectors: &[SubSymbol], coefficient: Option<&Expr>) -> Result<String, RenderError> {
        let mut select = selectors
            .iter()
            .map(|s| Ok(format!("{} AS {s}", self.first_column(s)?)))
            .collect::<Result<Vec<_>, RenderError>>()?;
        if let Some(expr) = coefficient {
            select.push(self.coefficient(expr)?);
        }
        if select.is_empty() {
            select.push("1".to_string());
        }

        let joins = self.symbols.iter().flat_map(|(_, columns)| {
            columns
                .iter()
                .skip(1)
                .map(move |other| format!("{} = {other}", columns[0]))
        });
        let comparisons = self
            .comparisons
            .iter()
            .map(|c| {
                Ok(format!(
                    "{} {} {}",
                    self.side(c.left())?,
                    c.operator().sql(),
                    self.side(c.right())?
                ))
            })
            .collect::<Result<Vec<_>, RenderError>>()?;
        let anti_joins = self
            .anti_joins
            .iter()
            .map(|(table, columns)| {
                let conditions = columns
                    .iter()
                    .map(|(column, arg)| Ok(format!("{column} = {}", self.side(arg)?)))
                    .collect::<Result<Vec<_>, RenderError>>()?;
                Ok(format!(
                    "NOT EXISTS (SELECT 1 FROM {table} WHERE {})",
                    conditions.join(" AND ")
                ))
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let conditions: Vec<String> = joins
            .chain(self.const_conditions.iter().cloned())
            .chain(comparisons)
            .chain(anti_joins)
            .collect();

        let mut sql = format!("SELECT DISTINCT {}", select.join(", "));
        if !self.from.is_empty() {
            sql.push_str(&format!(" FROM {}", self.from.iter().join(", ")));
        }
        if !conditions.is_empty() {
            sql.push_str(&format!(" WHERE {}", conditions.join(" AND ")));
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PositionalSchema;
    use ir::{parse_formula, Query};
    use std::cell::Cell;

    /// Counts schema lookups to observe the column cache.
    struct CountingSchema<'a>(&'a Cell<usize>);

    impl SchemaSource for CountingSchema<'_> {
        fn column_names(&self, table: &str) -> Result<Vec<String>, RenderError> {
            self.0.set(self.0.get() + 1);
            Ok(match table {
                "edge" => vec!["src".into(), "dst".into()],
                _ => vec!["x".into(), "y".into(), "z".into()],
            })
        }
    }

    fn compile(symbols: &[&str], text: &str, coefficient: Option<&Expr>) -> String {
        let q = Query::parse(symbols, text).unwrap();
        QueryCompiler::new(PositionalSchema)
            .compile(q.symbols(), q.formula(), coefficient)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn full_clause_golden() {
        let coef = Expr::scale(-1.0, Expr::symbol("V"));
        let sql = compile(
            &["X", "Y"],
            "edge(X, Y) & ~source(X) & cap(X, Y, V) & V >= 5",
            Some(&coef),
        );
        assert_eq!(
            sql,
            "SELECT DISTINCT a1.c1 AS X, a1.c2 AS Y, -1 * a2.c3 \
             FROM edge AS a1, cap AS a2 \
             WHERE a1.c1 = a2.c1 AND a1.c2 = a2.c2 AND a2.c3 >= 5 \
             AND NOT EXISTS (SELECT 1 FROM source AS n1 WHERE n1.c1 = a1.c1)"
        );
    }

    #[test]
    fn constants_and_disjunction() {
        let sql = compile(&["Y"], "edge('a', Y) | edge(Y, b) & Y <> c", None);
        assert_eq!(
            sql,
            "SELECT DISTINCT a1.c2 AS Y FROM edge AS a1 WHERE a1.c1 = 'a' \
             UNION SELECT DISTINCT a1.c1 AS Y FROM edge AS a1 WHERE a1.c2 = 'b' AND a1.c1 <> 'c'"
        );
    }

    #[test]
    fn boolean_query_selects_one() {
        assert_eq!(
            compile(&[], "edge(a, b)", None),
            "SELECT DISTINCT 1 FROM edge AS a1 WHERE a1.c1 = 'a' AND a1.c2 = 'b'"
        );
        let mut compiler = QueryCompiler::new(PositionalSchema);
        assert_eq!(compiler.compile(&[], &Formula::False, None).unwrap(), None);
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(sql_literal(&Constant::text("o'neil")), "'o''neil'");
        assert_eq!(sql_literal(&Constant::Real(2.0)), "2.0");
    }

    #[test]
    fn unbound_symbols_are_rejected() {
        let q = Query::parse(&["Z"], "edge(X, Y)").unwrap();
        let err = QueryCompiler::new(PositionalSchema)
            .compile(q.symbols(), q.formula(), None)
            .unwrap_err();
        assert_eq!(err, RenderError::UnboundSymbol("Z".into()));

        let f = parse_formula("edge(X, Y)").unwrap();
        let cost = ir::PredicateTemplate::numeric("cost", 1);
        let atom = Atom::new(&cost, vec![Term::var("X")]).unwrap();
        let err = QueryCompiler::new(PositionalSchema)
            .compile(&[], &f, Some(&Expr::atom(atom)))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedCoefficient(_)));
    }

    #[test]
    fn column_names_are_cached_per_table() {
        let lookups = Cell::new(0);
        let mut compiler = QueryCompiler::new(CountingSchema(&lookups));
        let f = parse_formula("edge(X, Y) & edge(Y, Z) & cap(X, Y, V)").unwrap();
        let sql = compiler
            .compile(&[SubSymbol::new("X")], &f, None)
            .unwrap()
            .unwrap();
        assert!(sql.starts_with("SELECT DISTINCT a1.src AS X FROM edge AS a1, edge AS a2, cap AS a3"));
        compiler.compile(&[SubSymbol::new("Y")], &f, None).unwrap();
        assert_eq!(lookups.get(), 2);
    }

    #[test]
    fn fact_query_golden() {
        let cap = ir::PredicateTemplate::numeric("cap", 2);
        let atom = Atom::new(&cap, vec!["a".into(), Term::from(3)]).unwrap();
        let sql = QueryCompiler::new(PositionalSchema).fact_query(&atom).unwrap();
        assert_eq!(sql, "SELECT c3 FROM cap WHERE c1 = 'a' AND c2 = 3");
    }
}
