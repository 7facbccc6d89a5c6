fn main() {
    // Stamped into `--version` and the verbose startup line
    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);
    println!(
        "cargo:rustc-env=OOZEBANE_LONG_VERSION={} ({})",
        env!("CARGO_PKG_VERSION"),
        build_date
    );
    println!("cargo:rerun-if-changed=build.rs");
}
