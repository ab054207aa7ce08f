//! Texture error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::types::{CubeFace, ImageTarget, IntSize, PixelFormat, PixelType, TextureKind, Viewport};
use crate::backend::BackendError;

/// Errors that can occur while creating, loading, updating or caching textures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextureError {
    #[error("Failed to load texture from {}: {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },
    #[error("Failed to load {face:?} cube face from {}: {reason}", path.display())]
    CubeFaceLoadFailed {
        face: CubeFace,
        path: PathBuf,
        reason: String,
    },
    #[error("A different texture named '{0}' is already cached")]
    DuplicateName(String),
    #[error("Cannot cache a texture that has no name")]
    Unnamed,
    #[error("Region {rect:?} lies outside texture bounds {size:?}")]
    RegionOutOfBounds { rect: Viewport, size: IntSize },
    #[error("Expected {expected} pixels, got {actual}")]
    PixelCountMismatch { expected: usize, actual: usize },
    #[error("Texture has no GPU storage")]
    NotAllocated,
    #[error("Target {target:?} is not valid for a {kind:?} texture")]
    InvalidTarget { target: ImageTarget, kind: TextureKind },
    #[error("File path pattern '{0}' has no face placeholder")]
    MissingFacePlaceholder(String),
    #[error("Cube faces must be square and of equal size, got {0:?}")]
    MismatchedCubeFaces(Vec<IntSize>),
    #[error("Pixel format {format:?}/{ty:?} cannot hold image content")]
    UnsupportedPixelFormat { format: PixelFormat, ty: PixelType },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type TextureResult<T> = Result<T, TextureError>;
