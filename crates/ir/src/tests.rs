#[cfg(test)]
mod parser_tests {
    use crate::{parse_formula, CompareOp, Constant, Formula, IrError, Literal, Term};

    #[test]
    fn parse_atoms_and_connectives() {
        let f = parse_formula("edge(X, Y) & ~source(Y)").expect("parse conjunction");
        assert_eq!(f.to_string(), "edge(X, Y) & ~source(Y)");
        let Formula::And(children) = &f else {
            panic!("expected a conjunction, got {f:?}");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[1], Formula::Not(_)));
    }

    #[test]
    fn parse_precedence_and_parentheses() {
        let f = parse_formula("a(X) | b(X) & c(X)").expect("parse precedence");
        assert_eq!(f.to_dnf().len(), 2);
        let g = parse_formula("(a(X) | b(X)) & c(X)").expect("parse parentheses");
        assert_eq!(g.to_string(), "(a(X) | b(X)) & c(X)");
        assert_eq!(g.to_dnf().len(), 2);
    }

    #[test]
    fn parse_constants() {
        let f = parse_formula("cap(a, 'node b', 3, -2.5)").expect("parse constants");
        let Formula::Atom(atom) = f else {
            panic!("expected an atom");
        };
        assert_eq!(
            atom.arguments(),
            &[
                Term::Const(Constant::text("a")),
                Term::Const(Constant::text("node b")),
                Term::Const(Constant::Integer(3)),
                Term::Const(Constant::Real(-2.5)),
            ]
        );
        assert!(atom.template().is_boolean());
        assert_eq!(atom.arity(), 4);
    }

    #[test]
    fn parse_comparisons() {
        for (src, op) in [
            ("X < 3", CompareOp::Less),
            ("X <= 3", CompareOp::LessEqual),
            ("X = Y", CompareOp::Equal),
            ("X != Y", CompareOp::NotEqual),
            ("X <> Y", CompareOp::NotEqual),
            ("X >= 3", CompareOp::GreaterEqual),
            ("X > 3", CompareOp::Greater),
        ] {
            let f = parse_formula(src).expect("parse comparison");
            let Formula::Compare(c) = f else {
                panic!("expected a comparison for {src}");
            };
            assert_eq!(c.operator(), op, "{src}");
        }
    }

    #[test]
    fn parse_booleans_and_negated_comparison() {
        assert_eq!(parse_formula("true").unwrap(), Formula::True);
        assert_eq!(parse_formula("false").unwrap(), Formula::False);
        let f = parse_formula("node(X) & ~(X = a)").unwrap();
        let dnf = f.to_dnf();
        assert_eq!(dnf.len(), 1);
        assert!(matches!(&dnf[0][1], Literal::Compare(c) if c.operator() == CompareOp::NotEqual));
    }

    #[test]
    fn parse_errors_are_reported() {
        assert!(matches!(parse_formula("edge(X, "), Err(IrError::Parse(_))));
        assert!(matches!(parse_formula("edge()"), Err(IrError::Parse(_))));
        assert!(matches!(parse_formula(""), Err(IrError::Parse(_))));
    }
}
