//! Fixed path scheme of the vendor drop.
//!
//! Everything lives under `<root>/myMPC_FORCESPro/`, exactly as the solver
//! generator laid it out: `src/` holds the one C file, `obj/` the
//! intermediate object, `lib/` the produced libraries.

use std::path::{Path, PathBuf};

use crate::SOLVER_NAME;

#[derive(Debug, Clone)]
pub struct BuildLayout {
    root: PathBuf,
}

impl BuildLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        BuildLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn solver_dir(&self) -> PathBuf {
        self.root.join(SOLVER_NAME)
    }

    /// The single compilation unit: `myMPC_FORCESPro/src/myMPC_FORCESPro.c`.
    pub fn source(&self) -> PathBuf {
        self.solver_dir().join("src").join(format!("{SOLVER_NAME}.c"))
    }

    pub fn obj_dir(&self) -> PathBuf {
        self.solver_dir().join("obj")
    }

    pub fn object(&self) -> PathBuf {
        let ext = if cfg!(target_os = "windows") { "obj" } else { "o" };
        self.obj_dir().join(format!("{SOLVER_NAME}.{ext}"))
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.solver_dir().join("lib")
    }

    pub fn static_lib(&self) -> PathBuf {
        let name = if cfg!(target_os = "windows") {
            format!("{SOLVER_NAME}.lib")
        } else {
            format!("lib{SOLVER_NAME}.a")
        };
        self.lib_dir().join(name)
    }

    pub fn shared_lib(&self) -> PathBuf {
        let ext = if cfg!(target_os = "windows") {
            "dll"
        } else if cfg!(target_os = "macos") {
            "dylib"
        } else {
            "so"
        };
        self.lib_dir().join(format!("{SOLVER_NAME}.{ext}"))
    }

    /// Build manifest recording what was produced and how.
    pub fn manifest(&self) -> PathBuf {
        self.lib_dir().join(format!("{SOLVER_NAME}.build.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_solver_directory() {
        let layout = BuildLayout::new("/work");
        assert_eq!(
            layout.source(),
            PathBuf::from("/work/myMPC_FORCESPro/src/myMPC_FORCESPro.c")
        );
        assert_eq!(layout.obj_dir(), PathBuf::from("/work/myMPC_FORCESPro/obj"));
        assert_eq!(layout.lib_dir(), PathBuf::from("/work/myMPC_FORCESPro/lib"));
    }

    #[test]
    fn artifacts_follow_platform_conventions() {
        let layout = BuildLayout::new("/work");
        let static_name = layout.static_lib();
        let shared_name = layout.shared_lib();
        if cfg!(target_os = "windows") {
            assert!(static_name.ends_with("myMPC_FORCESPro.lib"));
            assert!(shared_name.ends_with("myMPC_FORCESPro.dll"));
        } else {
            assert!(static_name.ends_with("libmyMPC_FORCESPro.a"));
            let ext = shared_name.extension().unwrap();
            assert!(ext == "so" || ext == "dylib");
        }
    }
}
