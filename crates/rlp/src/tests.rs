#[cfg(test)]
mod flow_tests {
    use crate::flow::{max_flow, NETWORK};
    use crate::{RlpError, RlpProblem};
    use grounder::{BlockGrounder, Grounder, RecursiveGrounder};
    use ir::{Atom, Constraint, Expr, PredicateTemplate, Query, Relation, Sense, Term};
    use lifting::LiftedSolver;
    use logkb::FactBase;
    use solver::{DenseSimplex, LpSolver, SolveStatus};

    fn network() -> FactBase {
        let mut kb = FactBase::new();
        kb.load(NETWORK).expect("load network");
        kb
    }

    fn flow_atom(from: &str, to: &str) -> Atom {
        let template = PredicateTemplate::decision("flow", 2).unwrap();
        Atom::new(&template, vec![Term::from(from), Term::from(to)]).unwrap()
    }

    fn optimum<G: Grounder, S: LpSolver>(mut problem: RlpProblem<G, S>) -> f64 {
        assert_eq!(problem.solve().unwrap(), SolveStatus::Optimal);
        let solution = problem.solution().unwrap();
        let grounded = problem.grounded().unwrap();
        let x: Vec<f64> = solution.iter().map(|(_, v)| v).collect();
        assert!(grounded.artifact.is_feasible(&x, 1e-6));
        solution.objective()
    }

    #[test]
    fn max_flow_with_both_grounders() {
        let kb = network();
        let block = optimum(max_flow(BlockGrounder::new(&kb), DenseSimplex::default(), "a", "g").unwrap());
        let recursive =
            optimum(max_flow(RecursiveGrounder::new(&kb), DenseSimplex::default(), "a", "g").unwrap());
        assert!((block - 130.0).abs() < 1e-6);
        assert!((block - recursive).abs() < 1e-6);
    }

    #[test]
    fn lifted_max_flow_matches() {
        let kb = network();
        for lifted in [
            optimum(
                max_flow(BlockGrounder::new(&kb), LiftedSolver::new(DenseSimplex::default()), "a", "g")
                    .unwrap(),
            ),
            optimum(
                max_flow(
                    RecursiveGrounder::new(&kb),
                    LiftedSolver::new(DenseSimplex::default()),
                    "a",
                    "g",
                )
                .unwrap(),
            ),
        ] {
            assert!((lifted - 130.0).abs() < 1e-6);
        }
    }

    #[test]
    fn minimum_cut_edges_are_saturated() {
        let kb = network();
        let mut problem = max_flow(BlockGrounder::new(&kb), DenseSimplex::default(), "a", "g").unwrap();
        problem.solve().unwrap();
        let solution = problem.solution().unwrap();
        assert_eq!(solution.len(), 10);
        assert_eq!(solution.of("flow").count(), 10);
        for (edge, cap) in [(("a", "b"), 50.0), (("c", "d"), 60.0), (("c", "f"), 20.0)] {
            let value = solution.get(&flow_atom(edge.0, edge.1)).unwrap();
            assert!((value - cap).abs() < 1e-6, "{edge:?} carries {value}");
        }
    }

    #[test]
    fn grounded_layout() {
        let kb = network();
        let problem = max_flow(BlockGrounder::new(&kb), DenseSimplex::default(), "a", "g").unwrap();
        let grounded = problem.ground().unwrap();
        assert_eq!(grounded.artifact.num_columns(), 10);
        // capacity and non-negativity rows
        assert_eq!(grounded.artifact.num_inequalities(), 20);
        // conservation at b..f
        assert_eq!(grounded.artifact.num_equalities(), 5);
        assert!(problem.grounded().is_none());
    }

    #[test]
    fn empty_for_all_keeps_the_optimum() {
        let kb = network();
        let mut problem = max_flow(BlockGrounder::new(&kb), DenseSimplex::default(), "a", "g").unwrap();
        let before = problem.ground().unwrap().artifact;
        let flow = PredicateTemplate::decision("flow", 2).unwrap();
        problem.add_constraint(Constraint::for_all(
            Query::parse(&["X", "Y"], "blocked(X, Y)").unwrap(),
            Relation::eq(
                Expr::atom(Atom::new(&flow, vec![Term::var("X"), Term::var("Y")]).unwrap()),
                Expr::constant(0.0),
            ),
        ));
        let after = problem.ground().unwrap().artifact;
        assert_eq!(before, after);
        assert!((optimum(problem) - 130.0).abs() < 1e-6);
    }

    #[test]
    fn products_of_decisions_are_rejected() {
        let kb = network();
        let flow = PredicateTemplate::decision("flow", 2).unwrap();
        let mut problem = RlpProblem::new(
            "quadratic",
            Sense::Minimize,
            BlockGrounder::new(&kb),
            DenseSimplex::default(),
        );
        problem.add_decision_variable(flow.clone()).unwrap();
        let xy = Expr::atom(Atom::new(&flow, vec![Term::var("X"), Term::var("Y")]).unwrap());
        let yx = Expr::atom(Atom::new(&flow, vec![Term::var("Y"), Term::var("X")]).unwrap());
        problem
            .set_objective(Expr::sum(
                Query::parse(&["X", "Y"], "edge(X, Y)").unwrap(),
                Expr::mul(vec![xy, yx]),
            ))
            .unwrap();
        let err = problem.solve().unwrap_err();
        assert!(err.is_non_linear(), "{err}");
        assert_eq!(problem.status(), SolveStatus::Unsolved);
        assert!(problem.solution().is_none());
    }

    #[test]
    fn infeasible_demand_is_a_status() {
        let kb = network();
        let mut problem = max_flow(BlockGrounder::new(&kb), DenseSimplex::default(), "a", "g").unwrap();
        problem.add_constraint(Relation::ge(
            Expr::atom(flow_atom("a", "b")),
            Expr::constant(60.0),
        ));
        assert_eq!(problem.solve().unwrap(), SolveStatus::Infeasible);
        assert_eq!(problem.status(), SolveStatus::Infeasible);
        assert!(problem.solution().is_none());
    }

    #[test]
    fn declarations_are_checked() {
        let kb = network();
        let mut problem = max_flow(BlockGrounder::new(&kb), DenseSimplex::default(), "a", "g").unwrap();
        assert_eq!(
            problem.set_objective(Expr::constant(0.0)),
            Err(RlpError::ObjectiveAlreadySet)
        );
        let flow = PredicateTemplate::decision("flow", 2).unwrap();
        assert!(matches!(
            problem.add_decision_variable(flow),
            Err(RlpError::DuplicateDecision(_))
        ));
        assert!(matches!(
            problem.add_decision_variable(PredicateTemplate::numeric("cap", 2)),
            Err(RlpError::NotDecision(_))
        ));

        let text = problem.to_string();
        assert!(text.starts_with("problem maxflow\n"));
        assert!(text.contains("maximize sum("));
        assert!(text.contains("forall({X, Y | edge(X, Y)}"));
    }
}

#[cfg(test)]
mod sudoku_tests {
    use crate::RlpProblem;
    use grounder::{BlockGrounder, Grounded, Grounder, RecursiveGrounder};
    use ir::{Atom, Constant, Constraint, Expr, PredicateTemplate, Query, Relation, Sense, Term};
    use logkb::FactBase;
    use solver::{DenseSimplex, SolveStatus};

    /// A valid grid for boxes of side `k`, with values `1..=k*k`.
    fn pattern(k: i64, r: i64, c: i64) -> i64 {
        (r * k + r / k + c) % (k * k) + 1
    }

    /// Numbers, boxes, and every cell of the pattern as a clue (1-based).
    fn knowledge_base(k: i64) -> FactBase {
        let n = k * k;
        let mut kb = FactBase::new();
        for v in 1..=n {
            kb.insert("num", vec![Constant::Integer(v)]);
        }
        for r in 0..n {
            for c in 0..n {
                let b = (r / k) * k + c / k + 1;
                let cell = vec![Constant::Integer(r + 1), Constant::Integer(c + 1)];
                let mut boxed = cell.clone();
                boxed.push(Constant::Integer(b));
                kb.insert("box", boxed);
                let mut given = cell;
                given.push(Constant::Integer(pattern(k, r, c)));
                kb.insert("given", given);
            }
        }
        kb
    }

    fn x(r: &str, c: &str, v: &str) -> Expr {
        let template = PredicateTemplate::decision("x", 3).unwrap();
        Expr::atom(Atom::new(&template, vec![Term::var(r), Term::var(c), Term::var(v)]).unwrap())
    }

    /// `forall(outer, sum(inner, x(R, C, N)) = 1)`
    fn exactly_one(outer: &[&str], over: &str, inner: &[&str], within: &str) -> Constraint {
        Constraint::for_all(
            Query::parse(outer, over).unwrap(),
            Relation::eq(
                Expr::sum(Query::parse(inner, within).unwrap(), x("R", "C", "N")),
                Expr::constant(1.0),
            ),
        )
    }

    fn sudoku<G: Grounder>(grounder: G) -> RlpProblem<G, DenseSimplex> {
        let mut problem = RlpProblem::new("sudoku", Sense::Minimize, grounder, DenseSimplex::default());
        problem
            .add_decision_variable(PredicateTemplate::decision("x", 3).unwrap())
            .unwrap();
        problem.add_constraint(exactly_one(
            &["R", "C"],
            "num(R) & num(C)",
            &["N"],
            "num(N)",
        ));
        problem.add_constraint(exactly_one(
            &["R", "N"],
            "num(R) & num(N)",
            &["C"],
            "num(C)",
        ));
        problem.add_constraint(exactly_one(
            &["C", "N"],
            "num(C) & num(N)",
            &["R"],
            "num(R)",
        ));
        problem.add_constraint(exactly_one(
            &["B", "N"],
            "num(B) & num(N)",
            &["R", "C"],
            "box(R, C, B)",
        ));
        problem.add_constraint(Constraint::for_all(
            Query::parse(&["R", "C", "N"], "given(R, C, N)").unwrap(),
            Relation::eq(x("R", "C", "N"), Expr::constant(1.0)),
        ));
        problem.add_constraint(Constraint::for_all(
            Query::parse(&["R", "C", "N"], "num(R) & num(C) & num(N)").unwrap(),
            Relation::ge(x("R", "C", "N"), Expr::constant(0.0)),
        ));
        problem
    }

    fn cell(atom: &Atom) -> (i64, i64, i64) {
        let args = atom.ground_arguments().unwrap();
        let int = |c: &Constant| match c {
            Constant::Integer(v) => *v,
            other => panic!("unexpected argument {other:?}"),
        };
        (int(&args[0]), int(&args[1]), int(&args[2]))
    }

    /// The assignment `x(r, c, v) = 1` iff `grid(r, c) == v`, in column order.
    fn assignment(grounded: &Grounded, grid: impl Fn(i64, i64) -> i64) -> Vec<f64> {
        grounded
            .columns
            .atoms()
            .map(|atom| {
                let (r, c, v) = cell(&atom);
                if grid(r - 1, c - 1) == v {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[test]
    fn nine_by_nine_structure() {
        let kb = knowledge_base(3);
        for grounded in [
            sudoku(BlockGrounder::new(&kb)).ground().unwrap(),
            sudoku(RecursiveGrounder::new(&kb)).ground().unwrap(),
        ] {
            let lp = &grounded.artifact;
            assert_eq!(lp.num_columns(), 729);
            // four covering families of 81 rows, then 81 clues
            assert_eq!(lp.num_equalities(), 4 * 81 + 81);
            assert_eq!(lp.num_inequalities(), 729);
            assert_eq!(lp.b, vec![1.0; 405]);

            let solved = assignment(&grounded, |r, c| pattern(3, r, c));
            assert!(lp.is_feasible(&solved, 1e-9));

            // a valid grid that contradicts the clues
            let relabeled = assignment(&grounded, |r, c| pattern(3, r, c) % 9 + 1);
            assert!(!lp.is_feasible(&relabeled, 1e-9));
        }
    }

    #[test]
    fn four_by_four_solution_reproduces_the_clues() {
        let kb = knowledge_base(2);
        let mut problem = sudoku(BlockGrounder::new(&kb));
        assert_eq!(problem.solve().unwrap(), SolveStatus::Optimal);
        let solution = problem.solution().unwrap();
        assert_eq!(solution.len(), 64);
        for (atom, value) in solution.iter() {
            let (r, c, v) = cell(atom);
            let expected = if pattern(2, r - 1, c - 1) == v { 1.0 } else { 0.0 };
            assert!((value - expected).abs() < 1e-6, "{atom} = {value}");
        }
    }
}
