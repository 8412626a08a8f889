#![allow(clippy::float_cmp)]

//! A brute-force backend over binary selections, used to drive the
//! prepare/solve/recover cycle end to end.

use std::time::Instant;

use quorum_core::{
    Choice, CompileOptions, ConstraintSpec, DisplaySpec, FixMask, FixMaskBuilder, Problem, Program,
};
use quorum_solver::{
    Linearization, SolutionView, Solve, SolverConfig, SolverError, SolverStatus, ensure_linear,
    prepare_program, recover_selection, recover_solution, selected_choices,
};

struct Enumerator {
    linear_only: bool,
}

#[derive(Debug)]
struct Enumerated {
    status: SolverStatus,
    values: Vec<f64>,
    objective: f64,
    seconds: f64,
}

impl SolutionView for Enumerated {
    fn objective_value(&self) -> f64 {
        self.objective
    }

    fn status(&self) -> SolverStatus {
        self.status
    }

    fn values(&self) -> &[f64] {
        &self.values
    }

    fn solve_time_seconds(&self) -> f64 {
        self.seconds
    }
}

impl Solve for Enumerator {
    type Solution = Enumerated;

    /// Maximize the first display over every binary point of the outermost
    /// space; ties keep the first point found. The time limit is checked
    /// before each point.
    fn solve(
        &mut self,
        program: &Program<'_>,
        config: &SolverConfig,
    ) -> Result<Enumerated, SolverError> {
        if self.linear_only {
            ensure_linear(program)?;
        }
        let started = Instant::now();
        let n = program.n_var();
        let tol = config.feasibility_tolerance();
        let mut best: Option<(f64, Vec<f64>)> = None;
        let mut status = SolverStatus::Optimal;
        for bits in 0u32..(1 << n) {
            if config.time_limit_reached(started.elapsed().as_secs_f64()) {
                status = SolverStatus::ReachedTimeLimit;
                break;
            }
            let point: Vec<f64> = (0..n).map(|i| f64::from((bits >> i) & 1)).collect();
            if !program.constraint_violations(&point, tol)?.is_empty() {
                continue;
            }
            let score = program
                .evaluate_displays(&point)?
                .first()
                .copied()
                .unwrap_or(0.0);
            if best.as_ref().is_none_or(|(top, _)| score > *top) {
                if config.logs_to_console() {
                    tracing::info!(
                        component = "enumerate",
                        operation = "solve",
                        status = "improved",
                        objective = score,
                        "New incumbent"
                    );
                }
                best = Some((score, point));
            }
        }
        let seconds = started.elapsed().as_secs_f64();
        match best {
            Some((objective, values)) => Ok(Enumerated {
                status,
                values,
                objective,
                seconds,
            }),
            None if status == SolverStatus::ReachedTimeLimit => Err(SolverError::SolveFailure {
                status,
            }),
            None => Err(SolverError::SolveFailure {
                status: SolverStatus::Infeasible,
            }),
        }
    }
}

fn lunch(sources: &[&str]) -> Problem {
    let constraints = sources
        .iter()
        .enumerate()
        .map(|(i, source)| ConstraintSpec::parse(format!("c{i}"), *source).unwrap())
        .collect();
    Problem::new(vec![
        Choice::new("salad")
            .with_detail("cost", 8.0)
            .with_detail("taste", 3.0)
            .with_detail("vegan", 1.0),
        Choice::new("steak")
            .with_detail("cost", 20.0)
            .with_detail("taste", 9.0),
        Choice::new("soup")
            .with_detail("cost", 6.0)
            .with_detail("taste", 4.0)
            .with_detail("vegan", 1.0),
    ])
    .unwrap()
    .with_constraints(constraints)
    .with_displays(vec![DisplaySpec::parse("taste", "$taste").unwrap()])
}

/// Test: budget and mean-cost rows choose the tastiest affordable lunch
#[test]
fn test_linear_backend_solves_fraction_rows() {
    let problem = lunch(&["[$cost] <= 26", "[$cost / x] <= 13"]);
    let program = Program::from_problem(&problem).unwrap();
    let config = SolverConfig::new();
    let prepared = prepare_program(program, &config).unwrap();

    let solution = Enumerator { linear_only: true }
        .solve(&prepared, &config)
        .unwrap();
    assert!(solution.is_optimal());
    assert!(solution.solve_time_seconds() >= 0.0);
    let selection = recover_solution(&prepared, &solution).unwrap();
    // steak + soup costs 26 at a mean of 13.
    assert_eq!(selection, vec![0.0, 1.0, 1.0]);
    assert_eq!(solution.objective_value(), 13.0);
    assert_eq!(selected_choices(&prepared, &selection), vec!["steak", "soup"]);
}

/// Test: product rows go through the RLT lift and back
#[test]
fn test_products_are_solved_in_the_lifted_space() {
    let problem = lunch(&["[x[0] * x[1] + x[1] * x[2]] <= 0", "[x] >= 2"]);
    let config = SolverConfig::new();
    let prepared = prepare_program(Program::from_problem(&problem).unwrap(), &config).unwrap();
    assert_eq!(prepared.n_var(), 5);

    let solution = Enumerator { linear_only: true }
        .solve(&prepared, &config)
        .unwrap();
    let selection = recover_selection(&prepared, solution.values()).unwrap();
    assert_eq!(selection, vec![1.0, 0.0, 1.0]);
}

/// Test: an explored selection is cut off by the exclusion image
#[test]
fn test_exclusion_image_forces_a_new_selection() {
    let problem = lunch(&["[$cost] <= 26"])
        .with_exclusions(vec![vec![0.0, 1.0, 1.0]])
        .unwrap();
    let options = CompileOptions::default().with_exclusions(false);
    let base = Program::new(&problem, FixMask::identity(3), options).unwrap();

    let mut builder = FixMaskBuilder::new(3);
    builder.fix_variable(1, 1.0).unwrap();
    let image = base.create_image(builder.finalize()).unwrap();
    let config = SolverConfig::new();
    let prepared = prepare_program(image, &config).unwrap();
    assert!(prepared.has_bridge());

    let solution = Enumerator { linear_only: true }
        .solve(&prepared, &config)
        .unwrap();
    let selection = recover_selection(&prepared, solution.values()).unwrap();
    assert_eq!(selection, vec![0.0, 1.0, 0.0]);
}

/// Test: linear backends refuse rows left nonlinear by the easy pass
#[test]
fn test_linear_backend_rejects_easy_leftovers() {
    let problem = lunch(&["[abs($taste - 10)] <= 2"]);
    let easy = SolverConfig::new().with_linearization(Linearization::Easy);
    let prepared = prepare_program(Program::from_problem(&problem).unwrap(), &easy).unwrap();
    let err = Enumerator { linear_only: true }
        .solve(&prepared, &easy)
        .unwrap_err();
    assert_eq!(err.code(), "PROGRAM_NOT_LINEAR");

    let solution = Enumerator { linear_only: false }
        .solve(&prepared, &easy)
        .unwrap();
    let selection = recover_selection(&prepared, solution.values()).unwrap();
    // Only steak (9) and salad with steak (12) land within 2 of 10.
    assert_eq!(selection, vec![1.0, 1.0, 0.0]);
}

/// Test: infeasible rows surface as a solve failure
#[test]
fn test_infeasible_program_reports_status() {
    let problem = lunch(&["[$cost] >= 100"]);
    let config = SolverConfig::new();
    let prepared = prepare_program(Program::from_problem(&problem).unwrap(), &config).unwrap();
    let err = Enumerator { linear_only: true }
        .solve(&prepared, &config)
        .unwrap_err();
    assert_eq!(
        err,
        SolverError::SolveFailure {
            status: SolverStatus::Infeasible
        }
    );
}

/// Test: a zero time limit stops before the first point
#[test]
fn test_time_limit_stops_the_search() {
    let problem = lunch(&["[$cost] <= 26"]);
    let config = SolverConfig::new().with_time_limit(0.0);
    let prepared = prepare_program(Program::from_problem(&problem).unwrap(), &config).unwrap();
    let err = Enumerator { linear_only: true }
        .solve(&prepared, &config)
        .unwrap_err();
    assert_eq!(
        err,
        SolverError::SolveFailure {
            status: SolverStatus::ReachedTimeLimit
        }
    );

    let generous = SolverConfig::new()
        .with_time_limit(3600.0)
        .with_log_to_console(true);
    let solution = Enumerator { linear_only: true }
        .solve(&prepared, &generous)
        .unwrap();
    assert!(solution.is_optimal());
    assert!(solution.solve_time_seconds() < 3600.0);
    assert_eq!(
        recover_solution(&prepared, &solution).unwrap(),
        vec![0.0, 1.0, 1.0]
    );
}
