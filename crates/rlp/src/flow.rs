//! Maximum flow as a relational LP.
//!
//! ```text
//! maximize  sum({X | edge(X, sink)}, flow(X, sink))
//! forall({X, Y | edge(X, Y)}, flow(X, Y) <= cap(X, Y))
//! forall({X, Y | edge(X, Y)}, flow(X, Y) >= 0)
//! forall({V | node(V) & V != source & V != sink},
//!        sum({U | edge(U, V)}, flow(U, V)) = sum({W | edge(V, W)}, flow(V, W)))
//! ```

use crate::error::RlpError;
use crate::problem::RlpProblem;
use grounder::Grounder;
use ir::{Atom, Constraint, Expr, PredicateTemplate, Query, Relation, Sense, Term};
use solver::LpSolver;

/// Seven nodes `a`..`g` with source `a` and sink `g`; the maximum flow is 130.
pub const NETWORK: &str = "node(a) & node(b) & node(c) & node(d) & node(e) & node(f) & node(g) & \
    edge(a, b) & edge(a, c) & edge(b, d) & edge(b, e) & edge(c, d) & \
    edge(c, f) & edge(d, e) & edge(d, f) & edge(e, g) & edge(f, g) & \
    cap(a, b, 50) & cap(a, c, 100) & cap(b, d, 40) & cap(b, e, 20) & cap(c, d, 60) & \
    cap(c, f, 20) & cap(d, e, 50) & cap(d, f, 60) & cap(e, g, 70) & cap(f, g, 70)";

fn flow(template: &PredicateTemplate, from: Term, to: Term) -> Result<Expr, RlpError> {
    Ok(Expr::atom(Atom::new(template, vec![from, to])?))
}

/// Builds the max flow problem from `source` to `sink` over the knowledge
/// base relations `node/1`, `edge/2` and the numeric `cap/2`.
pub fn max_flow<G: Grounder, S: LpSolver>(
    grounder: G,
    solver: S,
    source: &str,
    sink: &str,
) -> Result<RlpProblem<G, S>, RlpError> {
    let template = PredicateTemplate::decision("flow", 2)?;
    let cap = PredicateTemplate::numeric("cap", 2);
    let (x, y) = (Term::var("X"), Term::var("Y"));

    let mut problem = RlpProblem::new("maxflow", Sense::Maximize, grounder, solver);
    problem.add_decision_variable(template.clone())?;

    problem.set_objective(Expr::sum(
        Query::parse(&["X"], &format!("edge(X, {sink})"))?,
        flow(&template, x.clone(), Term::from(sink))?,
    ))?;

    let edges = Query::parse(&["X", "Y"], "edge(X, Y)")?;
    problem.add_constraint(Constraint::for_all(
        edges.clone(),
        Relation::le(
            flow(&template, x.clone(), y.clone())?,
            Expr::atom(Atom::new(&cap, vec![x.clone(), y.clone()])?),
        ),
    ));
    problem.add_constraint(Constraint::for_all(
        edges,
        Relation::ge(flow(&template, x, y)?, Expr::constant(0.0)),
    ));

    let v = Term::var("V");
    problem.add_constraint(Constraint::for_all(
        Query::parse(&["V"], &format!("node(V) & V != {source} & V != {sink}"))?,
        Relation::eq(
            Expr::sum(
                Query::parse(&["U"], "edge(U, V)")?,
                flow(&template, Term::var("U"), v.clone())?,
            ),
            Expr::sum(
                Query::parse(&["W"], "edge(V, W)")?,
                flow(&template, v, Term::var("W"))?,
            ),
        ),
    ));
    Ok(problem)
}
