//! # Voxel Globe Entry Point
//!
//! Runs the headless flight in the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_GLOBE_CONFIG=config.json cargo run --release
//! ```

fn main() {
    voxel_globe::run();
}
