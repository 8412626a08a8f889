#![allow(clippy::float_cmp)]

use proptest::prelude::*;
use quorum_core::{
    Choice, CompileOptions, ConstraintSpec, FixMask, FixMaskBuilder, MaskLayer, MaskStack,
    Problem, Program,
};

/// `None` leaves the choice free, `Some(v)` fixes it to `v`.
fn fixings(n: usize) -> impl Strategy<Value = Vec<Option<bool>>> {
    prop::collection::vec(prop::option::of(any::<bool>()), n)
}

fn build_mask(fixed: &[Option<bool>]) -> FixMask {
    let mut builder = FixMaskBuilder::new(fixed.len());
    for (index, value) in fixed.iter().enumerate() {
        if let Some(value) = value {
            builder.fix_variable(index, f64::from(u8::from(*value))).unwrap();
        }
    }
    builder.finalize()
}

fn weighted_problem(weights: &[f64]) -> Problem {
    let choices = weights
        .iter()
        .enumerate()
        .map(|(i, w)| Choice::new(format!("c{i}")).with_detail("w", *w))
        .collect();
    Problem::new(choices)
        .unwrap()
        .with_constraints(vec![ConstraintSpec::parse("total", "[$w + x] <= 100").unwrap()])
}

proptest! {
    #[test]
    fn fix_mask_is_a_bijection_on_free_variables(fixed in fixings(6), seed in any::<u64>()) {
        let mask = build_mask(&fixed);
        let free = fixed.iter().filter(|v| v.is_none()).count();
        prop_assert_eq!(mask.n_var(), free);

        let masked: Vec<f64> = (0..free).map(|i| f64::from(u8::from((seed >> i) & 1 == 1))).collect();
        let stack = MaskStack::new(mask.clone());
        let full = stack.unmask(&masked, None).unwrap();
        prop_assert_eq!(full.len(), 6);
        for (index, value) in fixed.iter().enumerate() {
            if let Some(value) = value {
                prop_assert_eq!(full[index], f64::from(u8::from(*value)));
            }
        }
        prop_assert_eq!(stack.mask(&full, None).unwrap(), masked);

        for orig in 0..6 {
            if let Some(id) = mask.mask_id(orig) {
                prop_assert_eq!(mask.orig_id(id), Some(orig));
            } else {
                prop_assert!(mask.is_fixed(orig));
            }
        }
        prop_assert!(mask.check_bridge(&mask.make_bridge().unwrap()));
    }

    #[test]
    fn fixed_choices_fold_into_row_constants(
        weights in prop::collection::vec(-10.0f64..10.0, 5),
        fixed in fixings(5),
        seed in any::<u64>(),
    ) {
        let problem = weighted_problem(&weights);
        let mask = build_mask(&fixed);
        let free = mask.n_var();
        let options = CompileOptions::default();

        let reduced = Program::new(&problem, mask.clone(), options).unwrap();
        let full = Program::from_problem(&problem)
            .unwrap()
            .apply_mask(MaskLayer::Fix(mask))
            .unwrap();

        let point: Vec<f64> = (0..free).map(|i| f64::from(u8::from((seed >> i) & 1 == 1))).collect();
        let expanded = reduced.unmask(&point, None).unwrap();
        let direct = Program::from_problem(&problem)
            .unwrap()
            .evaluate_constraints(&expanded)
            .unwrap();

        let a = reduced.evaluate_constraints(&point).unwrap()[0].unwrap();
        let b = full.evaluate_constraints(&point).unwrap()[0].unwrap();
        let c = direct[0].unwrap();
        prop_assert!((a - c).abs() < 1e-9);
        prop_assert!((b - c).abs() < 1e-9);
    }
}
