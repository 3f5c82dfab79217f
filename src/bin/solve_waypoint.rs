//! Formulate the fixed waypoint-avoidance NLP and solve it once.
//!
//! The point (x, y) must stay outside a radius-3 circle at the origin while
//! sitting in the (empty) band between radius 0.95 and radius 1 around
//! (-2, 2.5); the objective drives y as high as the geometry allows, with
//! small regularization on the force and slip variables.

use mpc_workbench::model::{square, square_about, term, Problem};
use mpc_workbench::solver::{self, Settings, SolveError};

fn main() {
    if let Err(e) = run() {
        eprintln!("solve_waypoint: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), SolveError> {
    let mut problem = Problem::new();
    let force = problem.variable("F");
    let slip = problem.variable("s");
    let x = problem.variable("x");
    let y = problem.variable("y");
    // Declared for the single-step kinematics (x' = x + h v cos theta, ...)
    // that the multi-stage model would wire in; unused in this instance.
    let _speed = problem.variable("v");
    let _heading = problem.variable("theta");

    problem.subject_to((square(x) + square(y)).geq(9.0));
    problem.subject_to((square_about(x, -2.0) + square_about(y, 2.5)).geq(1.0));
    problem.subject_to((square_about(x, -2.0) + square_about(y, 2.5)).leq(0.9025));

    problem.minimize(-100.0 * term(y) + 0.1 * square(force) + 0.01 * square(slip));

    let solution = solver::solve(&problem, &Settings::default())?;
    println!("status: {}", solution.status);
    println!("optimal value {}", solution.objective);
    println!("optimal var {} {}", solution.value(x), solution.value(y));
    Ok(())
}
