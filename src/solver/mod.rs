//! One-shot NLP backend: augmented-Lagrangian outer loop around L-BFGS.
//!
//! A solve is a single invocation with no retry and no fallback. Whatever
//! happens inside the backend is reported as a terminal [`SolveStatus`];
//! `Err` is reserved for problems that are malformed before solving starts.

mod augmented;
mod status;

use thiserror::Error;

use crate::model::{Problem, Variable};

pub use status::{SolveStatus, SolverIteration};

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("invalid problem: {0}")]
    InvalidProblem(String),
}

/// Backend tuning knobs. The defaults solve the fixed waypoint instance and
/// are deterministic: the same problem always yields the same result.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Feasibility tolerance on the largest inequality violation.
    pub tol_feas: f64,
    /// Outer-iterate movement below which the solve is considered settled.
    pub tol_step: f64,
    /// Initial penalty weight.
    pub mu_init: f64,
    /// Multiplicative penalty escalation when violation stalls.
    pub mu_factor: f64,
    /// Penalty weight ceiling.
    pub mu_max: f64,
    /// Weight beyond which a stalled violation is declared infeasible.
    pub mu_infeasible: f64,
    /// Outer round budget.
    pub max_outer: usize,
    /// L-BFGS iteration budget per outer round.
    pub max_inner: u64,
    /// Starting point; all zeros when absent.
    pub initial_point: Option<Vec<f64>>,
    /// Subproblem cost below which the problem is declared unbounded.
    /// Enforced inside every cost evaluation, so even a single runaway
    /// line search terminates.
    pub objective_divergence: f64,
    /// Iterate magnitude beyond which the problem is declared unbounded.
    /// Enforced inside every cost/gradient evaluation.
    pub param_divergence: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tol_feas: 1e-6,
            tol_step: 1e-6,
            mu_init: 10.0,
            mu_factor: 10.0,
            mu_max: 1e12,
            mu_infeasible: 1e8,
            max_outer: 40,
            max_inner: 500,
            initial_point: None,
            objective_divergence: -1e12,
            param_divergence: 1e9,
        }
    }
}

/// Result of one solve.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolveStatus,
    /// Objective at the returned point (meaningful mainly when optimal).
    pub objective: f64,
    /// Final values for all declared variables.
    pub x: Vec<f64>,
    /// Largest inequality violation at the returned point.
    pub max_violation: f64,
    /// Per-round trace in declaration order.
    pub trace: Vec<SolverIteration>,
}

impl Solution {
    /// Value of `v` at the returned point.
    ///
    /// Panics when `v` was declared on a larger problem than the one solved.
    pub fn value(&self, v: Variable) -> f64 {
        match self.x.get(v.index()) {
            Some(val) => *val,
            None => panic!(
                "variable {} is not part of this solution ({} variables)",
                v.index(),
                self.x.len()
            ),
        }
    }
}

/// Solve `problem` once.
pub fn solve(problem: &Problem, settings: &Settings) -> Result<Solution, SolveError> {
    let n = problem.num_variables();
    if n == 0 {
        return Err(SolveError::InvalidProblem(
            "problem declares no decision variables".into(),
        ));
    }
    if let Some(max_idx) = problem.max_referenced_index() {
        if max_idx >= n {
            return Err(SolveError::InvalidProblem(format!(
                "expression references variable {max_idx} but only {n} are declared"
            )));
        }
    }
    let mut x = match &settings.initial_point {
        Some(p) if p.len() != n => {
            return Err(SolveError::InvalidProblem(format!(
                "initial point has length {} for {n} variables",
                p.len()
            )))
        }
        Some(p) => p.clone(),
        None => vec![0.0; n],
    };

    let constraints = problem.constraints();
    let mut lambda = vec![0.0; constraints.len()];
    let mut mu = settings.mu_init;
    let mut trace = Vec::new();
    let mut prev_violation = f64::INFINITY;
    let mut last_violation = f64::INFINITY;
    let mut status = SolveStatus::MaxIters;

    for round in 0..settings.max_outer {
        let subproblem = augmented::AugmentedLagrangian::new(
            problem,
            lambda.clone(),
            mu,
            settings.objective_divergence,
            settings.param_divergence,
        );
        let next = match augmented::minimize(subproblem, x.clone(), settings.max_inner) {
            Ok(p) => p,
            Err(augmented::InnerFailure::Diverged) => {
                status = SolveStatus::Unbounded;
                break;
            }
            Err(augmented::InnerFailure::Backend(detail)) => {
                eprintln!("inner minimization failed in round {round}: {detail}");
                status = SolveStatus::NumericalError;
                break;
            }
        };
        if next.iter().any(|v| !v.is_finite()) {
            status = SolveStatus::NumericalError;
            break;
        }

        let violation = constraints
            .iter()
            .map(|c| c.violation(&next))
            .fold(0.0, f64::max);
        let objective = problem.objective_value(&next);
        trace.push(SolverIteration {
            iter: round,
            mu,
            obj_value: objective,
            inf_pr: violation,
        });
        last_violation = violation;

        if objective < settings.objective_divergence
            || inf_norm(&next) > settings.param_divergence
        {
            x = next;
            status = SolveStatus::Unbounded;
            break;
        }

        for (lam, c) in lambda.iter_mut().zip(constraints) {
            *lam = (*lam + mu * c.residual(&next)).max(0.0);
        }

        let step = x
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        x = next;

        if violation <= settings.tol_feas && step <= settings.tol_step {
            status = SolveStatus::Optimal;
            break;
        }
        // A violation that refuses to shrink under an already huge penalty
        // weight is the infeasibility certificate this method can offer.
        if violation > settings.tol_feas
            && mu >= settings.mu_infeasible
            && violation > 0.5 * prev_violation
        {
            status = SolveStatus::Infeasible;
            break;
        }
        if violation > 0.25 * prev_violation {
            mu = (mu * settings.mu_factor).min(settings.mu_max);
        }
        prev_violation = violation;
    }

    if status == SolveStatus::MaxIters && last_violation <= settings.tol_feas {
        status = SolveStatus::Optimal;
    }

    let max_violation = constraints
        .iter()
        .map(|c| c.violation(&x))
        .fold(0.0, f64::max);
    Ok(Solution {
        status,
        objective: problem.objective_value(&x),
        x,
        max_violation,
        trace,
    })
}

fn inf_norm(x: &[f64]) -> f64 {
    x.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{square, square_about, term, Problem};

    // The waypoint instance: stay outside the radius-3 circle at the origin
    // and inside/outside the two rings around (-2, 2.5).
    fn waypoint_problem() -> Problem {
        let mut problem = Problem::new();
        let force = problem.variable("F");
        let slip = problem.variable("s");
        let x = problem.variable("x");
        let y = problem.variable("y");
        let _speed = problem.variable("v");
        let _heading = problem.variable("theta");
        problem.subject_to((square(x) + square(y)).geq(9.0));
        problem.subject_to((square_about(x, -2.0) + square_about(y, 2.5)).geq(1.0));
        problem.subject_to((square_about(x, -2.0) + square_about(y, 2.5)).leq(0.9025));
        problem.minimize(-100.0 * term(y) + 0.1 * square(force) + 0.01 * square(slip));
        problem
    }

    #[test]
    fn conflicting_rings_are_reported_infeasible() {
        // Distance-squared to (-2, 2.5) cannot be both >= 1 and <= 0.9025.
        let solution = solve(&waypoint_problem(), &Settings::default()).unwrap();
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(solution.max_violation > 1e-3);
        assert!(!solution.trace.is_empty());
    }

    #[test]
    fn feasible_variant_reaches_the_analytic_optimum() {
        // Dropping the outer ring leaves disk-minus-circle; -100 y drives the
        // point to the top of the disk: (-2, 3.45), objective -345.
        let mut problem = Problem::new();
        let force = problem.variable("F");
        let slip = problem.variable("s");
        let x = problem.variable("x");
        let y = problem.variable("y");
        problem.subject_to((square(x) + square(y)).geq(9.0));
        problem.subject_to((square_about(x, -2.0) + square_about(y, 2.5)).leq(0.9025));
        problem.minimize(-100.0 * term(y) + 0.1 * square(force) + 0.01 * square(slip));

        let solution = solve(&problem, &Settings::default()).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!(solution.max_violation <= 1e-5);
        assert!((solution.value(x) + 2.0).abs() < 5e-3);
        assert!((solution.value(y) - 3.45).abs() < 5e-3);
        assert!((solution.objective + 345.0).abs() < 1.0);
        // The regularized-but-unconstrained variables settle at zero.
        assert!(solution.value(force).abs() < 1e-4);
        assert!(solution.value(slip).abs() < 1e-4);
    }

    #[test]
    fn resolving_the_same_instance_is_deterministic() {
        let a = solve(&waypoint_problem(), &Settings::default()).unwrap();
        let b = solve(&waypoint_problem(), &Settings::default()).unwrap();
        assert_eq!(a.status, b.status);
        assert_eq!(a.objective, b.objective);
        assert_eq!(a.x, b.x);
    }

    #[test]
    fn unbounded_objective_is_reported_unbounded() {
        // y is unconstrained and -y has no minimum; the first inner solve
        // must trip the divergence bounds instead of running forever.
        let mut problem = Problem::new();
        let x = problem.variable("x");
        let y = problem.variable("y");
        problem.subject_to(square(x).leq(1.0));
        problem.minimize(-1.0 * term(y));

        let solution = solve(&problem, &Settings::default()).unwrap();
        assert_eq!(solution.status, SolveStatus::Unbounded);
    }

    #[test]
    #[should_panic(expected = "not part of this solution")]
    fn solution_value_rejects_a_foreign_variable() {
        let mut problem = Problem::new();
        let x = problem.variable("x");
        problem.subject_to(square(x).leq(4.0));
        let solution = solve(&problem, &Settings::default()).unwrap();

        let mut wider = Problem::new();
        let _a = wider.variable("a");
        let b = wider.variable("b");
        solution.value(b);
    }

    #[test]
    fn pure_feasibility_problem_solves_to_zero_objective() {
        let mut problem = Problem::new();
        let x = problem.variable("x");
        problem.subject_to(square(x).leq(4.0));

        let solution = solve(&problem, &Settings::default()).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, 0.0);
        assert!(solution.max_violation <= 1e-6);
    }

    #[test]
    fn empty_problem_is_rejected() {
        let problem = Problem::new();
        assert!(matches!(
            solve(&problem, &Settings::default()),
            Err(SolveError::InvalidProblem(_))
        ));
    }

    #[test]
    fn variable_from_another_problem_is_rejected() {
        let mut donor = Problem::new();
        let _a = donor.variable("a");
        let b = donor.variable("b");

        let mut problem = Problem::new();
        let _x = problem.variable("x");
        problem.subject_to(square(b).leq(1.0));
        assert!(matches!(
            solve(&problem, &Settings::default()),
            Err(SolveError::InvalidProblem(_))
        ));
    }

    #[test]
    fn mismatched_initial_point_is_rejected() {
        let mut problem = Problem::new();
        let _x = problem.variable("x");
        let settings = Settings {
            initial_point: Some(vec![0.0, 0.0]),
            ..Settings::default()
        };
        assert!(matches!(
            solve(&problem, &settings),
            Err(SolveError::InvalidProblem(_))
        ));
    }
}
