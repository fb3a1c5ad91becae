//! Build script for the domsnap Tauri app.
//!
//! Nothing platform-specific: Tauri code generation only.

fn main() {
    tauri_build::build();
}
