//! Build and exercise glue around the `myMPC_FORCESPro` solver drop.
//!
//! Two independent entry points live here, matching the two scripts this
//! crate replaces:
//!
//! - [`builder`] compiles the vendor C source into a static archive and a
//!   shared library exporting the single `myMPC_FORCESPro_solve` symbol,
//!   with compiler flags selected per toolchain capability ([`toolchain`]).
//! - [`model`] + [`solver`] formulate the fixed waypoint-avoidance NLP and
//!   solve it once through an augmented-Lagrangian backend.
//!
//! With the `vendor-solver` feature enabled, [`ffi`] additionally binds the
//! built shared library so the solver can be called from Rust.

pub mod builder;
pub mod model;
pub mod solver;
pub mod toolchain;

#[cfg(feature = "vendor-solver")]
pub mod ffi;

pub use builder::{build_library, BuildError, BuildLayout, BuildManifest};
pub use model::{Problem, Variable};
pub use solver::{solve, Settings, Solution, SolveError, SolveStatus};

/// Name of the vendor solver; every path and symbol derives from it.
pub const SOLVER_NAME: &str = "myMPC_FORCESPro";

/// The one symbol the shared library exports.
pub fn solver_entry_symbol() -> String {
    format!("{SOLVER_NAME}_solve")
}
