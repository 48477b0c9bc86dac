//! Image processing — pure Rust, no system dependencies.
//!
//! The module is split into:
//! - **Calculations**: pure functions deciding resize/crop dimensions
//!   (unit testable without pixels)
//! - **Engine**: the pixel transform executing a [`TransformPlan`]
//! - **Backend**: [`ImageBackend`] trait + [`FsBackend`] for decode/encode I/O

pub mod backend;
mod calculations;
pub mod engine;

pub use backend::{BackendError, FsBackend, ImageBackend};
pub use calculations::{TransformPlan, aspect_ratio_matches, fill_dimensions, plan_transform};
pub use engine::transform;
