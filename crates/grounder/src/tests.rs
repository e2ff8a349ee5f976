#[cfg(test)]
mod grounding_tests {
    use crate::{BlockGrounder, GroundError, Grounded, Grounder, LpArtifact, RecursiveGrounder};
    use ir::{Atom, Constraint, Expr, Model, PredicateTemplate, Query, Relation, Sense, Term};
    use logkb::{FactBase, KbError};

    const NETWORK: &str = "node(s) & node(a) & node(t) & \
                           edge(s, a) & edge(a, t) & edge(s, t) & \
                           cap(s, a, 4) & cap(a, t, 3) & cap(s, t, 2)";

    fn network() -> FactBase {
        let mut kb = FactBase::new();
        kb.load(NETWORK).expect("load network");
        kb
    }

    fn flow_template() -> PredicateTemplate {
        PredicateTemplate::decision("flow", 2).unwrap()
    }

    fn flow(x: Term, y: Term) -> Expr {
        Expr::atom(Atom::new(&flow_template(), vec![x, y]).unwrap())
    }

    fn cap(x: Term, y: Term) -> Expr {
        let cap = PredicateTemplate::numeric("cap", 2);
        Expr::atom(Atom::new(&cap, vec![x, y]).unwrap())
    }

    fn v(name: &str) -> Term {
        Term::var(name)
    }

    /// Max flow from `s` to `t`: objective, capacities, conservation.
    fn flow_model() -> Model {
        let mut model = Model::new(Sense::Maximize);
        model.decision.push(flow_template());
        model.objective = Some(Expr::sum(
            Query::parse(&["X"], "edge(X, t)").unwrap(),
            flow(v("X"), Term::from("t")),
        ));
        model.constraints.push(Constraint::for_all(
            Query::parse(&["X", "Y"], "edge(X, Y)").unwrap(),
            Relation::le(flow(v("X"), v("Y")), cap(v("X"), v("Y"))),
        ));
        model.constraints.push(Constraint::for_all(
            Query::parse(&["V"], "node(V) & V != s & V != t").unwrap(),
            Relation::eq(
                Expr::sum(Query::parse(&["U"], "edge(U, V)").unwrap(), flow(v("U"), v("V"))),
                Expr::sum(Query::parse(&["W"], "edge(V, W)").unwrap(), flow(v("V"), v("W"))),
            ),
        ));
        model
    }

    fn both(model: &Model, kb: &FactBase) -> (Result<Grounded, GroundError>, Result<Grounded, GroundError>) {
        (
            BlockGrounder::new(kb).ground(model),
            RecursiveGrounder::new(kb).ground(model),
        )
    }

    #[test]
    fn flow_model_layout() {
        let kb = network();
        let grounded = BlockGrounder::new(&kb).ground(&flow_model()).unwrap();
        let lp = &grounded.artifact;

        let names: Vec<String> = grounded.columns.atoms().map(|a| a.to_string()).collect();
        assert_eq!(names, vec!["flow('a', 't')", "flow('s', 't')", "flow('s', 'a')"]);

        assert_eq!(lp.c, vec![-1.0, -1.0, 0.0]);
        assert_eq!(
            lp.g.to_dense(),
            vec![
                vec![0.0, 0.0, 1.0],
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
            ]
        );
        assert_eq!(lp.h, vec![4.0, 3.0, 2.0]);
        assert_eq!(lp.a.to_dense(), vec![vec![-1.0, 0.0, 1.0]]);
        assert_eq!(lp.b, vec![0.0]);
    }

    #[test]
    fn strategies_agree_on_flow_model() {
        let kb = network();
        let (block, recursive) = both(&flow_model(), &kb);
        let (block, recursive) = (block.unwrap(), recursive.unwrap());
        assert_eq!(block.artifact, recursive.artifact);
        assert_eq!(block.columns, recursive.columns);
    }

    #[test]
    fn grounding_is_deterministic() {
        let kb = network();
        let model = flow_model();
        let grounder = BlockGrounder::new(&kb);
        assert_eq!(grounder.ground(&model).unwrap(), grounder.ground(&model).unwrap());
        let grounder = RecursiveGrounder::new(&kb);
        assert_eq!(grounder.ground(&model).unwrap(), grounder.ground(&model).unwrap());
    }

    #[test]
    fn empty_for_all_adds_no_rows() {
        let kb = network();
        let mut model = flow_model();
        let before = BlockGrounder::new(&kb).ground(&model).unwrap().artifact;
        model.constraints.push(Constraint::for_all(
            Query::parse(&["X"], "missing(X)").unwrap(),
            Relation::le(flow(v("X"), v("X")), Expr::constant(1.0)),
        ));
        let (block, recursive) = both(&model, &kb);
        assert_eq!(block.unwrap().artifact, before);
        assert_eq!(recursive.unwrap().artifact, before);
    }

    #[test]
    fn greater_equal_rows_are_negated() {
        let kb = network();
        let mut model = Model::new(Sense::Minimize);
        model.decision.push(flow_template());
        model.constraints.push(Constraint::for_all(
            Query::parse(&["X", "Y"], "edge(X, Y)").unwrap(),
            Relation::ge(flow(v("X"), v("Y")), Expr::constant(1.0)),
        ));
        for grounded in [both(&model, &kb).0.unwrap(), both(&model, &kb).1.unwrap()] {
            let lp: LpArtifact = grounded.artifact;
            assert_eq!(lp.num_inequalities(), 3);
            assert!(lp.g.iter().all(|(_, _, value)| value == -1.0));
            assert_eq!(lp.h, vec![-1.0; 3]);
        }
    }

    #[test]
    fn decision_free_rows_are_dropped_or_rejected() {
        let kb = network();
        let count_nodes = || Expr::sum(Query::parse(&["X"], "node(X)").unwrap(), Expr::constant(1.0));

        let mut vacuous = Model::new(Sense::Minimize);
        vacuous
            .constraints
            .push(Relation::le(count_nodes(), Expr::constant(5.0)).into());
        let (block, recursive) = both(&vacuous, &kb);
        assert_eq!(block.unwrap().artifact.num_inequalities(), 0);
        assert_eq!(recursive.unwrap().artifact.num_inequalities(), 0);

        let mut infeasible = Model::new(Sense::Minimize);
        infeasible
            .constraints
            .push(Relation::le(count_nodes(), Expr::constant(2.0)).into());
        let (block, recursive) = both(&infeasible, &kb);
        assert!(matches!(block, Err(GroundError::Infeasible(_))));
        assert!(matches!(recursive, Err(GroundError::Infeasible(_))));
    }

    #[test]
    fn undeclared_decision_variables_are_rejected() {
        let kb = network();
        let mut model = flow_model();
        model.decision.clear();
        let (block, recursive) = both(&model, &kb);
        assert!(matches!(block, Err(GroundError::UndeclaredDecision(_))));
        assert!(matches!(recursive, Err(GroundError::UndeclaredDecision(_))));
    }

    #[test]
    fn missing_facts_are_resolution_errors() {
        let mut kb = FactBase::new();
        kb.load(&NETWORK.replace(" & cap(s, t, 2)", "")).unwrap();
        let (block, recursive) = both(&flow_model(), &kb);
        assert!(matches!(block, Err(GroundError::Resolution(_))), "{block:?}");
        assert_eq!(
            recursive,
            Err(GroundError::UndefinedFact("cap('s', 't')".into()))
        );
    }

    #[test]
    fn ambiguous_facts_are_resolution_errors() {
        let mut kb = FactBase::new();
        kb.load(&format!("{NETWORK} & cap(s, t, 5)")).unwrap();
        let (block, recursive) = both(&flow_model(), &kb);
        assert!(matches!(block, Err(GroundError::Resolution(_))), "{block:?}");
        assert_eq!(
            recursive,
            Err(GroundError::Kb(KbError::Inconsistent {
                atom: "cap('s', 't')".into(),
                count: 2
            }))
        );
    }

    #[test]
    fn objective_constants_must_resolve() {
        let budget = PredicateTemplate::numeric("budget", 1);
        let mut model = flow_model();
        model.objective = Some(Expr::add(vec![
            flow(Term::from("s"), Term::from("t")),
            Expr::atom(Atom::new(&budget, vec![Term::from("nowhere")]).unwrap()),
        ]));

        let kb = network();
        let (block, recursive) = both(&model, &kb);
        assert!(matches!(block, Err(GroundError::Resolution(_))), "{block:?}");
        assert_eq!(
            recursive,
            Err(GroundError::UndefinedFact("budget('nowhere')".into()))
        );

        let mut kb = network();
        kb.load("budget(nowhere, 7)").unwrap();
        let (block, recursive) = both(&model, &kb);
        let (block, recursive) = (block.unwrap(), recursive.unwrap());
        assert_eq!(block.artifact.c, recursive.artifact.c);
        assert_eq!(block.artifact.c.iter().filter(|c| **c != 0.0).count(), 1);
    }

    #[test]
    fn sums_shadow_for_all_symbols() {
        let kb = network();
        let mut model = Model::new(Sense::Maximize);
        model.decision.push(flow_template());
        model.constraints.push(Constraint::for_all(
            Query::parse(&["X"], "node(X)").unwrap(),
            Relation::le(
                Expr::sum(
                    Query::parse(&["X"], "edge(X, t)").unwrap(),
                    flow(v("X"), Term::from("t")),
                ),
                Expr::constant(10.0),
            ),
        ));
        let (block, recursive) = both(&model, &kb);
        for grounded in [block.unwrap(), recursive.unwrap()] {
            let lp = grounded.artifact;
            assert_eq!(lp.g.to_dense(), vec![vec![1.0, 1.0]; 3]);
            assert_eq!(lp.h, vec![10.0; 3]);
        }
    }

    #[test]
    fn products_of_decisions_are_rejected() {
        let kb = network();
        let mut model = flow_model();
        model.objective = Some(Expr::sum(
            Query::parse(&["X", "Y"], "edge(X, Y)").unwrap(),
            Expr::mul(vec![flow(v("X"), v("Y")), flow(v("Y"), v("X"))]),
        ));
        let (block, recursive) = both(&model, &kb);
        assert!(block.unwrap_err().is_non_linear());
        assert!(recursive.unwrap_err().is_non_linear());
    }

    #[test]
    fn boolean_atoms_in_expressions_are_structural_errors() {
        let kb = network();
        let mut model = flow_model();
        let edge = PredicateTemplate::boolean("edge", 2).unwrap();
        model.objective = Some(Expr::atom(
            Atom::new(&edge, vec![Term::from("s"), Term::from("a")]).unwrap(),
        ));
        let (block, _) = both(&model, &kb);
        assert!(matches!(block, Err(GroundError::Structural(_))));
    }

    #[test]
    fn artifact_serializes() {
        let kb = network();
        let grounded = BlockGrounder::new(&kb).ground(&flow_model()).unwrap();
        let json = serde_json::to_string(&grounded.artifact).unwrap();
        let back: LpArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grounded.artifact);
    }
}
