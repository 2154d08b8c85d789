//! Core error types.

use thiserror::Error;

/// Errors raised while constructing or mutating core data.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Volume byte length does not match the stated dimensions.
    #[error("volume data holds {actual} bytes but dimensions {dim:?} require {expected}")]
    VolumeSize {
        dim: (u32, u32, u32),
        expected: usize,
        actual: usize,
    },

    /// A volume dimension is zero.
    #[error("volume dimensions must be at least 1 in every axis, got {dim:?}")]
    VolumeDimensions { dim: (u32, u32, u32) },

    /// A volume spacing component is not strictly positive.
    #[error("volume spacing must be strictly positive, got {spacing:?}")]
    VolumeSpacing { spacing: (f32, f32, f32) },

    /// Transfer curve capacity exceeded.
    #[error("transfer curve holds at most {max} control points, got {actual}")]
    CurveCapacity { max: usize, actual: usize },

    /// Knot vector length does not satisfy `colors + degree + 1`.
    #[error("knot vector of length {knots} does not match {points} control points (expected {expected})")]
    KnotArity {
        knots: usize,
        points: usize,
        expected: usize,
    },

    /// Knot positions are not non-decreasing.
    #[error("knot positions must be non-decreasing (knot {index} decreases)")]
    KnotOrder { index: usize },

    /// A knot position lies outside `[0, 1]`.
    #[error("knot position {value} at index {index} lies outside [0, 1]")]
    KnotRange { index: usize, value: f32 },

    /// A control-point index is out of range.
    #[error("control point index {index} out of range ({len} points)")]
    PointIndex { index: usize, len: usize },

    /// Mesh arrays disagree in length.
    #[error("mesh has {positions} positions but {normals} normals")]
    MeshArity { positions: usize, normals: usize },

    /// A mesh index references a missing vertex.
    #[error("mesh index {index} out of range ({vertices} vertices)")]
    MeshIndex { index: u32, vertices: usize },

    /// Mesh index count is not a multiple of three.
    #[error("mesh index count {indices} is not a whole number of triangles")]
    MeshTriangles { indices: usize },
}

/// A specialized Result type for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
