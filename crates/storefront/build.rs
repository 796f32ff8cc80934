//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so its URL changes whenever its content does.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_css();
}

/// Hash `static/css/main.css` into the `CSS_HASH` compile-time variable.
///
/// Templates append the hash as a `?v=` query, so no renamed copy of the
/// file is needed.
fn hash_css() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let short_hash = match fs::read(&css_path) {
        Ok(content) => {
            let digest = format!("{:x}", Sha256::digest(&content));
            digest.chars().take(10).collect::<String>()
        }
        Err(e) => {
            println!("cargo:warning=Could not read main.css: {e}");
            String::from("dev")
        }
    };

    println!("cargo:rustc-env=CSS_HASH={short_hash}");
}
