fn main() {
    // libgpio only exists on FreeBSD; elsewhere the crate still compiles and
    // the simulator-backed tests run without a native library.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("freebsd") {
        println!("cargo:rustc-link-lib=gpio");
    }
}
