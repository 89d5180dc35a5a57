//! # Cube Sandbox Entry Point
//!
//! This is the entry point of the headless driver.
//! It simply calls into the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    cube_sandbox::run();
}
