//! Version command.

pub(crate) fn show_version() {
    println!("zpm {}", env!("CARGO_PKG_VERSION"));
}
