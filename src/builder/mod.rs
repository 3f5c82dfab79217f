//! The static/shared library build sequence for the vendor solver.
//!
//! Four steps, run to completion or aborted on the first failure: ensure the
//! output directories exist, compile the one source file to an object,
//! archive it into a static library, link it into a shared library exporting
//! the single solver entry point. No retries, no partial-artifact cleanup.

mod layout;
mod manifest;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::toolchain::{Family, Toolchain};
use crate::{solver_entry_symbol, SOLVER_NAME};

pub use layout::BuildLayout;
pub use manifest::BuildManifest;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("solver source not found at {0}")]
    MissingSource(PathBuf),
    #[error("no usable C compiler: {0}")]
    NoCompiler(String),
    #[error("{stage} failed: {detail}")]
    Stage {
        stage: &'static str,
        detail: String,
    },
    #[error("manifest error: {0}")]
    Manifest(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Run the full build sequence for the layout's vendor drop.
///
/// Re-running against the same layout is idempotent in effect: the same
/// artifact set with the same exported symbol is produced each time.
pub fn build_library(layout: &BuildLayout) -> Result<BuildManifest, BuildError> {
    let source = layout.source();
    if !source.is_file() {
        return Err(BuildError::MissingSource(source));
    }

    let toolchain = Toolchain::detect()?;

    fs::create_dir_all(layout.obj_dir())?;
    fs::create_dir_all(layout.lib_dir())?;

    let object = layout.object();
    compile(&toolchain, &source, &object)?;
    archive(&toolchain, &object, &layout.static_lib())?;
    link_shared(&toolchain, &object, &layout.shared_lib())?;

    let profile = toolchain.profile();
    let manifest = BuildManifest {
        solver: SOLVER_NAME.to_string(),
        compiler: toolchain.compiler_path().to_path_buf(),
        family: toolchain.family().to_string(),
        compile_flags: profile.compile_flags(),
        link_libs: profile.link_libs.iter().map(|l| l.to_string()).collect(),
        static_lib: layout.static_lib(),
        shared_lib: layout.shared_lib(),
        exported_symbol: solver_entry_symbol(),
    };
    manifest.write(&layout.manifest())?;
    Ok(manifest)
}

fn compile(toolchain: &Toolchain, source: &Path, object: &Path) -> Result<(), BuildError> {
    let mut cmd = toolchain.command();
    match toolchain.family() {
        Family::Msvc => {
            cmd.arg("/nologo")
                .arg("/c")
                .arg(source)
                .arg(format!("/Fo{}", object.display()));
        }
        _ => {
            cmd.args(toolchain.profile().compile_flags())
                .arg("-c")
                .arg(source)
                .arg("-o")
                .arg(object);
        }
    }
    run_stage("compile", &mut cmd)
}

fn archive(toolchain: &Toolchain, object: &Path, static_lib: &Path) -> Result<(), BuildError> {
    // A stale archive would keep accumulating members; rebuild from scratch.
    if static_lib.exists() {
        fs::remove_file(static_lib)?;
    }
    let mut cmd = toolchain.archiver();
    match toolchain.family() {
        Family::Msvc => {
            cmd.arg("/nologo")
                .arg(format!("/OUT:{}", static_lib.display()))
                .arg(object);
        }
        _ => {
            cmd.arg("crs").arg(static_lib).arg(object);
        }
    }
    run_stage("archive", &mut cmd)
}

fn link_shared(toolchain: &Toolchain, object: &Path, shared_lib: &Path) -> Result<(), BuildError> {
    let mut cmd = toolchain.command();
    let profile = toolchain.profile();
    match toolchain.family() {
        Family::Msvc => {
            cmd.arg("/nologo")
                .arg("/LD")
                .arg(object)
                .arg(format!("/Fe:{}", shared_lib.display()))
                .arg("/link")
                .arg(format!("/EXPORT:{}", solver_entry_symbol()));
        }
        _ => {
            cmd.arg("-shared");
            if let Some(pic) = profile.pic {
                cmd.arg(pic);
            }
            if let Some(openmp) = profile.openmp {
                cmd.arg(openmp);
            }
            cmd.arg("-o").arg(shared_lib).arg(object);
            for lib in &profile.link_libs {
                cmd.arg(format!("-l{lib}"));
            }
        }
    }
    run_stage("link", &mut cmd)
}

fn run_stage(stage: &'static str, cmd: &mut Command) -> Result<(), BuildError> {
    let output = cmd.output().map_err(|e| BuildError::Stage {
        stage,
        detail: e.to_string(),
    })?;
    if !output.status.success() {
        let mut detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if detail.is_empty() {
            detail = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
        if detail.is_empty() {
            detail = format!("exit status {}", output.status);
        }
        return Err(BuildError::Stage { stage, detail });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_is_reported_before_toolchain_detection() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BuildLayout::new(dir.path());
        let err = build_library(&layout).unwrap_err();
        match err {
            BuildError::MissingSource(path) => {
                assert!(path.ends_with("myMPC_FORCESPro/src/myMPC_FORCESPro.c"));
            }
            other => panic!("expected MissingSource, got {other}"),
        }
        // Nothing may be created when the source is absent.
        assert!(!layout.obj_dir().exists());
        assert!(!layout.lib_dir().exists());
    }
}
