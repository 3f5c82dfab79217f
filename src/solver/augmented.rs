//! Augmented-Lagrangian subproblem, minimized with L-BFGS via `argmin`.
//!
//! Inequalities are handled with the Powell-Hestenes-Rockafellar term: for
//! each residual `g(x) <= 0` with multiplier estimate `lambda` and penalty
//! weight `mu`, the subproblem cost picks up
//! `(max(0, lambda + mu g)^2 - lambda^2) / (2 mu)`, which is smooth in `x`.
//!
//! An unbounded subproblem sends the line search off to infinity inside a
//! single L-BFGS iteration, where no iteration budget can stop it. Every
//! cost/gradient evaluation therefore enforces the divergence bounds itself
//! and aborts the solve, which [`minimize`] reports as
//! [`InnerFailure::Diverged`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use argmin::core::{CostFunction, Error, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;

use crate::model::{Constraint, Problem, QuadExpr};

/// Why an inner minimization stopped without a usable iterate.
pub(super) enum InnerFailure {
    /// An evaluation fell outside the divergence bounds; the subproblem is
    /// unbounded below.
    Diverged,
    /// Any other backend error (failed line search, non-finite arithmetic).
    Backend(String),
}

pub(super) struct AugmentedLagrangian {
    objective: Option<QuadExpr>,
    constraints: Vec<Constraint>,
    lambda: Vec<f64>,
    mu: f64,
    n: usize,
    /// Cost value below which an evaluation aborts the solve.
    cost_floor: f64,
    /// Iterate magnitude beyond which an evaluation aborts the solve.
    param_bound: f64,
    diverged: Arc<AtomicBool>,
}

impl AugmentedLagrangian {
    pub(super) fn new(
        problem: &Problem,
        lambda: Vec<f64>,
        mu: f64,
        cost_floor: f64,
        param_bound: f64,
    ) -> Self {
        AugmentedLagrangian {
            objective: problem.objective().cloned(),
            constraints: problem.constraints().to_vec(),
            lambda,
            mu,
            n: problem.num_variables(),
            cost_floor,
            param_bound,
            diverged: Arc::new(AtomicBool::new(false)),
        }
    }

    fn diverged_err(&self) -> Error {
        self.diverged.store(true, Ordering::Relaxed);
        Error::msg("evaluation outside divergence bounds")
    }

    fn check_iterate(&self, p: &[f64]) -> Result<(), Error> {
        if p.iter().any(|v| !v.is_finite() || v.abs() > self.param_bound) {
            return Err(self.diverged_err());
        }
        Ok(())
    }
}

impl CostFunction for AugmentedLagrangian {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> Result<Self::Output, Error> {
        self.check_iterate(p)?;
        let mut acc = self.objective.as_ref().map_or(0.0, |obj| obj.value(p));
        for (lam, c) in self.lambda.iter().zip(&self.constraints) {
            let shifted = lam + self.mu * c.residual(p);
            if shifted > 0.0 {
                acc += (shifted * shifted - lam * lam) / (2.0 * self.mu);
            } else {
                acc -= lam * lam / (2.0 * self.mu);
            }
        }
        if acc < self.cost_floor {
            return Err(self.diverged_err());
        }
        Ok(acc)
    }
}

impl Gradient for AugmentedLagrangian {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, p: &Self::Param) -> Result<Self::Gradient, Error> {
        self.check_iterate(p)?;
        let mut grad = vec![0.0; self.n];
        if let Some(obj) = &self.objective {
            obj.add_gradient(p, 1.0, &mut grad);
        }
        for (lam, c) in self.lambda.iter().zip(&self.constraints) {
            let shifted = lam + self.mu * c.residual(p);
            if shifted > 0.0 {
                c.add_residual_gradient(p, shifted, &mut grad);
            }
        }
        Ok(grad)
    }
}

fn failure(diverged: &AtomicBool, e: Error) -> InnerFailure {
    if diverged.load(Ordering::Relaxed) {
        InnerFailure::Diverged
    } else {
        InnerFailure::Backend(e.to_string())
    }
}

/// One inner minimization, warm-started at `x0`.
pub(super) fn minimize(
    subproblem: AugmentedLagrangian,
    x0: Vec<f64>,
    max_iters: u64,
) -> Result<Vec<f64>, InnerFailure> {
    let diverged = subproblem.diverged.clone();

    // A warm start can sit exactly on the subproblem's stationary point
    // (e.g. a strictly feasible start with no objective); the line search
    // cannot work with a zero direction, so answer directly.
    let g0 = subproblem
        .gradient(&x0)
        .map_err(|e| failure(&diverged, e))?;
    if g0.iter().all(|g| g.abs() <= 1e-12) {
        return Ok(x0);
    }

    let fallback = x0.clone();
    let linesearch = MoreThuenteLineSearch::new();
    let solver = LBFGS::new(linesearch, 10);
    let result = Executor::new(subproblem, solver)
        .configure(|state| state.param(x0).max_iters(max_iters))
        .run()
        .map_err(|e| failure(&diverged, e))?;
    Ok(result.state().get_best_param().cloned().unwrap_or(fallback))
}
