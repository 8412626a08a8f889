use crate::mask::{FixMask, FixMaskBuilder};
use crate::problem::{Choice, ConstraintSpec, Problem};

pub(super) fn lunch() -> Problem {
    Problem::new(vec![
        Choice::new("salad").with_detail("vegan", 1.0).with_detail("cost", 8.0),
        Choice::new("steak").with_detail("cost", 20.0).with_detail("meat", 1.0),
        Choice::new("soup").with_detail("cost", 6.0),
    ])
    .unwrap()
}

pub(super) fn constraint(problem: Problem, source: &str) -> Problem {
    constraints(problem, &[source])
}

pub(super) fn constraints(problem: Problem, sources: &[&str]) -> Problem {
    let specs = sources
        .iter()
        .enumerate()
        .map(|(i, source)| ConstraintSpec::parse(format!("c{i}"), *source).unwrap())
        .collect();
    problem.with_constraints(specs)
}

pub(super) fn fixing(n: usize, fixed: &[(usize, f64)]) -> FixMask {
    let mut builder = FixMaskBuilder::new(n);
    for &(index, value) in fixed {
        builder.fix_variable(index, value).unwrap();
    }
    builder.finalize()
}
