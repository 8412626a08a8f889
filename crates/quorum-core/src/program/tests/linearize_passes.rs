use super::support::{constraint, constraints, lunch};
use super::*;
use crate::problem::DisplaySpec;

fn linear_row(constraint: &ProgramConstraint) -> (Vec<f64>, f64) {
    let leaf = constraint
        .expr
        .as_ref()
        .and_then(Node::as_linear)
        .expect("linear row");
    (leaf.coefficients().to_vec(), leaf.constant())
}

#[test]
fn fraction_with_positive_denominator_splits_on_finite_sides() {
    let problem = constraint(lunch(), "[$cost / x] >= 5");
    let program = Program::from_problem(&problem).unwrap();
    assert_eq!(program.constraints()[0].class, ConstraintClass::Frac1);

    let program = program.linearize(false).unwrap();
    assert!(program.is_linear());
    assert_eq!(program.constraints().len(), 1);
    let row = &program.constraints()[0];
    assert_eq!(linear_row(row), (vec![3.0, 15.0, 1.0], 0.0));
    assert_eq!((row.lower, row.upper), (0.0, f64::INFINITY));
    assert_eq!(row.detail_set, Some(DetailSetId::new(0)));
    assert!(row.relaxable);
}

#[test]
fn negative_denominator_flips_the_bounds() {
    let problem = constraint(lunch(), "-4 <= [x[0] / (0 - x[1])] <= -1");
    let program = Program::from_problem(&problem).unwrap();
    assert_eq!(program.constraints()[0].class, ConstraintClass::Frac1);

    let program = program.linearize(false).unwrap();
    assert_eq!(program.constraints().len(), 2);
    let lower = &program.constraints()[0];
    assert_eq!(linear_row(lower), (vec![1.0, -1.0, 0.0], 0.0));
    assert_eq!((lower.lower, lower.upper), (0.0, f64::INFINITY));
    let upper = &program.constraints()[1];
    assert_eq!(linear_row(upper), (vec![1.0, -4.0, 0.0], 0.0));
    assert_eq!((upper.lower, upper.upper), (f64::NEG_INFINITY, 0.0));
}

#[test]
fn products_are_lifted_with_mccormick_rows() {
    let problem = constraint(lunch(), "[x[0] * x[1] + x[2]] <= 1");
    let program = Program::from_problem(&problem).unwrap();
    assert_eq!(program.constraints()[0].class, ConstraintClass::Quad);

    let program = program.linearize(false).unwrap();
    assert_eq!(program.n_var(), 4);
    assert_eq!(program.n_var_orig(None), 3);
    assert_eq!(program.stack().outermost().name(), "rlt");
    assert_eq!(program.constraints().len(), 4);
    assert!(program.is_linear());
    assert_eq!(
        linear_row(&program.constraints()[0]),
        (vec![0.0, 0.0, 1.0, 1.0], 0.0)
    );

    let tol = program.options().mccormick_tolerance;
    let envelope: Vec<_> = program.constraints()[1..]
        .iter()
        .map(|c| (linear_row(c).0, c.lower, c.upper))
        .collect();
    assert_eq!(
        envelope,
        vec![
            (vec![-1.0, 0.0, 0.0, 1.0], f64::NEG_INFINITY, tol),
            (vec![0.0, -1.0, 0.0, 1.0], f64::NEG_INFINITY, tol),
            (vec![-1.0, -1.0, 0.0, 1.0], -1.0 - tol, f64::INFINITY),
        ]
    );
    assert!(program.constraints()[1..].iter().all(|c| c.detail_set.is_none()));
}

#[test]
fn mccormick_rows_hold_exactly_at_consistent_corners() {
    let problem = constraint(lunch(), "[x[0] * x[1]] <= 1");
    let program = Program::from_problem(&problem).unwrap().linearize(false).unwrap();
    let envelope = &program.constraints()[1..];
    for corner in 0..8u8 {
        let xi = f64::from(corner & 1);
        let xj = f64::from((corner >> 1) & 1);
        let y = f64::from((corner >> 2) & 1);
        let point = [xi, xj, 0.0, y];
        let holds = envelope.iter().all(|c| c.is_satisfied(&point, 0.0));
        assert_eq!(holds, y == xi * xj, "corner {point:?}");
    }
}

#[test]
fn lifted_program_agrees_with_the_original_on_binary_points() {
    let problem = constraints(lunch(), &["[x[0] * x[1] + x[2]] <= 1", "[$cost / x] >= 5"])
        .with_displays(vec![DisplaySpec::parse("pair", "x[0] * x[1]").unwrap()]);
    let original = Program::from_problem(&problem).unwrap();
    let lifted = original.clone().linearize(false).unwrap();

    for corner in 1..8u8 {
        let point: Vec<f64> = (0..3).map(|i| f64::from((corner >> i) & 1)).collect();
        let lifted_point = lifted.mask(&point, None).unwrap();
        assert_eq!(lifted_point.len(), 4);
        let feasible = original.constraint_violations(&point, 1e-9).unwrap().is_empty();
        let lifted_feasible = lifted
            .constraint_violations(&lifted_point, 1e-9)
            .unwrap()
            .is_empty();
        assert_eq!(feasible, lifted_feasible, "point {point:?}");
        assert_eq!(
            lifted.evaluate_displays(&lifted_point).unwrap(),
            original.evaluate_displays(&point).unwrap()
        );
        assert_eq!(lifted.unmask(&lifted_point, None).unwrap(), point);
    }
}

#[test]
fn unsupported_rows_fail_unless_easy() {
    let problem = constraints(lunch(), &["[$cost] <= 20", "[abs(x[0] - x[1])] <= 1"]);
    let program = Program::from_problem(&problem).unwrap();
    assert_eq!(
        program.clone().linearize(false).unwrap_err(),
        ProgramError::NotLinearizable { index: 1 }
    );

    let kept = program.linearize(true).unwrap();
    assert_eq!(kept.constraints().len(), 2);
    assert_eq!(kept.constraints()[1].class, ConstraintClass::Others);
    assert!(!kept.is_linear());
}

#[test]
fn linear_program_is_returned_unchanged() {
    let problem = constraints(lunch(), &["[$cost] <= 20", "[x] >= 1"]);
    let program = Program::from_problem(&problem).unwrap();
    assert!(program.is_linear());
    let linearized = program.clone().linearize(false).unwrap();
    assert!(linearized.is_similar(&program));
    assert_eq!(linearized.stack().layers().len(), 1);
}
