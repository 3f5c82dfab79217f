use std::env;
use std::path::PathBuf;

fn main() {
    // The runtime compiler probe configures `cc` outside a build script, so
    // the target/host triples must be baked into the binary here.
    println!("cargo:rustc-env=TARGET={}", env::var("TARGET").unwrap());
    println!("cargo:rustc-env=HOST={}", env::var("HOST").unwrap());

    // Linking the vendor drop is opt-in: the default build must succeed
    // before `build_solver` has ever produced the artifact.
    if env::var_os("CARGO_FEATURE_VENDOR_SOLVER").is_some() {
        let lib_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap())
            .join("myMPC_FORCESPro")
            .join("lib");
        println!("cargo:rustc-link-search=native={}", lib_dir.display());
        println!("cargo:rustc-link-lib=dylib=myMPC_FORCESPro");

        // The vendor code is built with OpenMP and clock_gettime on Linux.
        if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("linux") {
            println!("cargo:rustc-link-lib=dylib=rt");
            println!("cargo:rustc-link-lib=dylib=gomp");
        }
    }
}
