//! Call the built vendor solver once with a sample initial state.
//!
//! Requires the `vendor-solver` feature and a prior `build_solver` run so
//! the shared library exists at link time.

use mpc_workbench::ffi::{self, Params};

fn main() {
    if let Err(e) = run() {
        eprintln!("run_mpc: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), ffi::SolverFailure> {
    let mut params = Params {
        minusA_times_x0: [-4.0, 2.0],
    };
    let (output, info) = ffi::solve_step(&mut params)?;
    println!("u0 = {}", output.u0[0]);
    println!(
        "iterations {} (res_eq {:.3e}, res_ineq {:.3e}, pobj {:.6}, {:.3} ms)",
        info.it,
        info.res_eq,
        info.res_ineq,
        info.pobj,
        info.solvetime * 1e3
    );
    Ok(())
}
