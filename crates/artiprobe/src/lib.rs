//! Top-level facade crate for artiprobe.
//!
//! Re-exports the core types and the exporter library so users can depend on
//! a single crate.

pub mod core {
    pub use artiprobe_core::*;
}

pub mod exporter {
    pub use artiprobe_exporter::*;
}
