use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=PLPLOT_LIB_DIR");
    println!("cargo:rerun-if-env-changed=PLPLOT_LIB_NAME");

    // Only the native backend needs the shared library
    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    if let Some(dir) = env::var_os("PLPLOT_LIB_DIR") {
        let lib_dir = PathBuf::from(dir);
        println!("cargo:rustc-link-search=native={}", lib_dir.display());

        // Let dev runs find the library without installing it
        let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
        if target_os == "linux" || target_os == "macos" {
            println!("cargo:rustc-link-arg=-Wl,-rpath,{}", lib_dir.display());
        }
    }

    let lib_name = env::var("PLPLOT_LIB_NAME").unwrap_or_else(|_| "plplot".to_string());
    println!("cargo:rustc-link-lib=dylib={}", lib_name);
}
