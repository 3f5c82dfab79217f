//! Terminal solve states and the per-round iteration trace.

use std::fmt;

/// Outcome of a solve. Always one of these; backend trouble surfaces as
/// `NumericalError`, never as a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Feasible within tolerance and converged.
    Optimal,
    /// Constraint violation stopped improving under maximal penalty weight.
    Infeasible,
    /// Iterates diverged while the objective kept falling.
    Unbounded,
    /// Outer iteration budget exhausted without a verdict.
    MaxIters,
    /// The inner minimizer failed or produced non-finite values.
    NumericalError,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::MaxIters => "max_iterations",
            SolveStatus::NumericalError => "numerical_error",
        };
        f.write_str(name)
    }
}

/// Snapshot taken after each outer round.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverIteration {
    pub iter: usize,
    pub mu: f64,
    pub obj_value: f64,
    /// Largest inequality violation (primal infeasibility).
    pub inf_pr: f64,
}
