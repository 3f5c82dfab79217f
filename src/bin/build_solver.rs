//! Build the vendor solver drop found in the current working directory.
//!
//! Expects `./myMPC_FORCESPro/src/myMPC_FORCESPro.c`; produces the static
//! archive and shared library under `./myMPC_FORCESPro/lib`.

use mpc_workbench::{build_library, BuildError, BuildLayout};

fn main() {
    if let Err(e) = run() {
        eprintln!("build_solver: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), BuildError> {
    let cwd = std::env::current_dir()?;
    let layout = BuildLayout::new(cwd);
    let manifest = build_library(&layout)?;
    println!(
        "built {} ({} toolchain, flags: {})",
        manifest.solver,
        manifest.family,
        manifest.compile_flags.join(" ")
    );
    println!("  static: {}", manifest.static_lib.display());
    println!("  shared: {} (exports {})", manifest.shared_lib.display(), manifest.exported_symbol);
    Ok(())
}
