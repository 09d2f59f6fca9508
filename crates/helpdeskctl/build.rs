// Exposes HELPDESK_VERSION to `--version`. Packagers can stamp a release
// string through the same variable; otherwise the crate version is used.

fn main() {
    let version = std::env::var("HELPDESK_VERSION")
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=HELPDESK_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=HELPDESK_VERSION");
}
