//! C toolchain discovery and capability-based flag selection.
//!
//! The original build script branched on the compiler *class* (Unix-like vs
//! everything else). Here the branch is an explicit [`FlagProfile`] record
//! chosen per compiler [`Family`], and every optional flag is verified
//! against the live compiler before it is used.

use std::fmt;
use std::process::{Command, Stdio};

use crate::builder::BuildError;

/// Compiler family, derived from the detected tool rather than the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Gnu,
    Clang,
    Msvc,
    Other,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Gnu => "gnu",
            Family::Clang => "clang",
            Family::Msvc => "msvc",
            Family::Other => "other",
        };
        f.write_str(name)
    }
}

/// The flag record the build sequence consumes.
///
/// `None` means the capability is absent for this toolchain and the step
/// simply omits the flag. MSVC and unknown families run with compiler
/// defaults, as the original did.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagProfile {
    /// Optimization level (`-O3` on GNU-flavoured compilers).
    pub opt: Option<&'static str>,
    /// Position-independent code, required for the shared library.
    pub pic: Option<&'static str>,
    /// Shared-memory parallelism; the vendor source contains OpenMP pragmas.
    pub openmp: Option<&'static str>,
    /// Vector-instruction codegen; only meaningful on x86 targets.
    pub vector: Option<&'static str>,
    /// Extra libraries appended when linking the shared object.
    pub link_libs: Vec<&'static str>,
}

impl FlagProfile {
    /// Baseline profile for a compiler family, before capability probing.
    pub fn for_family(family: Family) -> Self {
        match family {
            Family::Gnu | Family::Clang => FlagProfile {
                opt: Some("-O3"),
                pic: Some("-fPIC"),
                openmp: Some("-fopenmp"),
                vector: Some("-mavx"),
                link_libs: if cfg!(target_os = "linux") {
                    if family == Family::Gnu {
                        vec!["rt", "gomp"]
                    } else {
                        vec!["rt"]
                    }
                } else {
                    Vec::new()
                },
            },
            Family::Msvc | Family::Other => FlagProfile {
                opt: None,
                pic: None,
                openmp: None,
                vector: None,
                link_libs: Vec::new(),
            },
        }
    }

    /// All compile-step flags present in the profile, in a fixed order.
    pub fn compile_flags(&self) -> Vec<String> {
        [self.opt, self.pic, self.openmp, self.vector]
            .iter()
            .flatten()
            .map(|f| f.to_string())
            .collect()
    }
}

/// A detected C compiler plus the flag profile it actually supports.
pub struct Toolchain {
    tool: cc::Tool,
    family: Family,
    profile: FlagProfile,
}

impl Toolchain {
    /// Locate the host C compiler and derive its flag profile.
    ///
    /// Fails only when no compiler can be found; individual flags that the
    /// compiler rejects are dropped from the profile instead.
    pub fn detect() -> Result<Self, BuildError> {
        let tool = cc::Build::new()
            .cargo_metadata(false)
            .opt_level(0)
            .debug(false)
            .target(env!("TARGET"))
            .host(env!("HOST"))
            .try_get_compiler()
            .map_err(|e| BuildError::NoCompiler(e.to_string()))?;

        let family = if tool.is_like_msvc() {
            Family::Msvc
        } else if tool.is_like_clang() {
            Family::Clang
        } else if tool.is_like_gnu() {
            Family::Gnu
        } else {
            Family::Other
        };

        let mut profile = FlagProfile::for_family(family);
        if !cfg!(any(target_arch = "x86", target_arch = "x86_64")) {
            profile.vector = None;
        }
        if let Some(flag) = profile.vector {
            if !probe_flag(&tool, flag) {
                profile.vector = None;
            }
        }
        if let Some(flag) = profile.openmp {
            if !probe_flag(&tool, flag) {
                profile.openmp = None;
                profile.link_libs.retain(|lib| *lib != "gomp");
            }
        }

        Ok(Toolchain {
            tool,
            family,
            profile,
        })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn profile(&self) -> &FlagProfile {
        &self.profile
    }

    pub fn compiler_path(&self) -> &std::path::Path {
        self.tool.path()
    }

    /// Fresh compiler invocation with the tool's environment applied.
    pub fn command(&self) -> Command {
        self.tool.to_command()
    }

    /// The archiver paired with this compiler family.
    pub fn archiver(&self) -> Command {
        match self.family {
            Family::Msvc => Command::new("lib.exe"),
            _ => Command::new(std::env::var_os("AR").unwrap_or_else(|| "ar".into())),
        }
    }
}

/// Check whether the compiler accepts `flag` by running a preprocess-only
/// pass over empty input. Unknown flags make every family here exit non-zero.
fn probe_flag(tool: &cc::Tool, flag: &str) -> bool {
    let mut cmd = Command::new(tool.path());
    cmd.arg(flag)
        .args(["-x", "c", "-E", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    matches!(cmd.status(), Ok(status) if status.success())
}
