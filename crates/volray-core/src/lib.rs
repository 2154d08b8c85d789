//! Core data model for volray.
//!
//! This crate holds everything the renderer needs that is not tied to a GPU
//! device: the scalar volume and its host-side sampler, the bounding
//! geometry, the transfer curve and its evaluation, the compositing
//! semantics shared with the shaders, the trackball state machine, and the
//! user-facing render settings.

pub mod compositing;
pub mod error;
pub mod mesh;
pub mod settings;
pub mod transfer;
pub mod trackball;
pub mod volume;

pub use compositing::{ColorMode, CompositeParams, Compositor, march_ray};
pub use error::{CoreError, CoreResult};
pub use mesh::BoundingMesh;
pub use settings::{LensMode, LensSettings, RaySettings, RenderOptions};
pub use transfer::{TransferCurve, DEGREE, MAX_CONTROL_POINTS, TRANSFER_LUT_WIDTH};
pub use trackball::Trackball;
pub use volume::Volume;
