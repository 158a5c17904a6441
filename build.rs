//! Build script for Atelier
//!
//! Embeds when and for what the binary was built. Nothing is written into the
//! source tree.

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=Cargo.toml");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=ATELIER_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=ATELIER_BUILD_PROFILE={}", profile);
    println!("cargo:rustc-env=ATELIER_BUILD_TARGET={}", target);
}
