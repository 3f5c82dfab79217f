//! Raw binding for the built `myMPC_FORCESPro` shared library.
//!
//! Struct layouts and exit flags are transcribed from the vendor header
//! (`myMPC_FORCESPro/include/myMPC_FORCESPro.h`). Only available with the
//! `vendor-solver` feature, after `build_solver` has produced the library.

#![allow(non_snake_case)]

use libc::{c_int, FILE};
use thiserror::Error;

pub type Number = f64;
pub type ExitFlag = c_int;

/// Solver converged within the configured accuracy.
pub const OPTIMAL: ExitFlag = 1;
/// Maximum number of iterations reached.
pub const MAXIT_REACHED: ExitFlag = 0;
/// No progress possible in the line search.
pub const NO_PROGRESS: ExitFlag = -7;
/// NaNs encountered; fatal internal error.
pub const NAN_DETECTED: ExitFlag = -10;

/// Run-time parameters; fill before calling the solver.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Params {
    /// `-A * x0`, the equality right-hand side for the initial state.
    pub minusA_times_x0: [Number; 2],
}

/// First-stage input produced by the solver.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub u0: [Number; 1],
}

/// Diagnostics from the last interior-point run.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Info {
    pub it: c_int,
    pub it2opt: c_int,
    pub res_eq: Number,
    pub res_ineq: Number,
    pub pobj: Number,
    pub dobj: Number,
    pub dgap: Number,
    pub rdgap: Number,
    pub mu: Number,
    pub mu_aff: Number,
    pub sigma: Number,
    pub lsit_aff: c_int,
    pub lsit_cc: c_int,
    pub step_aff: Number,
    pub step_cc: Number,
    pub solvetime: Number,
}

#[link(name = "myMPC_FORCESPro")]
extern "C" {
    /// The one exported symbol. Examine the exit flag before using `output`.
    pub fn myMPC_FORCESPro_solve(
        params: *mut Params,
        output: *mut Output,
        info: *mut Info,
        fs: *mut FILE,
    ) -> ExitFlag;
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("vendor solver returned exit flag {exit_flag}")]
pub struct SolverFailure {
    pub exit_flag: ExitFlag,
}

/// Safe wrapper around one solver call. Solver prints go to stdout.
pub fn solve_step(params: &mut Params) -> Result<(Output, Info), SolverFailure> {
    let mut output = Output::default();
    let mut info = Info::default();
    let flag = unsafe {
        let fs = libc::fdopen(libc::STDOUT_FILENO, b"w\0".as_ptr().cast());
        let flag = myMPC_FORCESPro_solve(params, &mut output, &mut info, fs);
        if !fs.is_null() {
            libc::fflush(fs);
        }
        flag
    };
    if flag == OPTIMAL {
        Ok((output, info))
    } else {
        Err(SolverFailure { exit_flag: flag })
    }
}
