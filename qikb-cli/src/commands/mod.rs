//! CLI command implementations.

pub mod build;
pub mod init;
pub mod verify;

pub use build::{build_kb, BuildOptions};
pub use init::init_project;
pub use verify::verify_kb;
