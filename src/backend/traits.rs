//! Core backend abstraction traits
//!
//! The texture layer treats the graphics context as an opaque sink for
//! allocate/upload/parameter/bind/delete calls. Every backend implements
//! [`GraphicsBackend`].

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::backend::types::*;
use crate::resources::TextureUnit;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u64);

impl TextureHandle {
    /// Raw backend identifier of this texture.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A graphics backend shared by every texture created from it.
///
/// All texture work happens on the thread owning the graphics context; the
/// mutex only serializes access when the host shares the backend across threads.
pub type SharedBackend = Arc<Mutex<dyn GraphicsBackend>>;

/// Wrap a backend so textures can share it.
pub fn share_backend<B: GraphicsBackend + 'static>(backend: B) -> Arc<Mutex<B>> {
    Arc::new(Mutex::new(backend))
}

/// Graphics context sink used by textures.
///
/// Apart from handle creation, all calls are treated as synchronous and
/// always succeeding.
pub trait GraphicsBackend: Send {
    /// Human readable backend name
    fn name(&self) -> &'static str;

    /// Generate a new, empty texture handle
    fn create_texture(&mut self, kind: TextureKind) -> BackendResult<TextureHandle>;

    /// (Re)allocate storage for one image of a texture, discarding existing content
    fn allocate_image(
        &mut self,
        texture: TextureHandle,
        target: ImageTarget,
        size: IntSize,
        format: PixelFormat,
        ty: PixelType,
    );

    /// Upload texels into a rectangle of one image
    ///
    /// Rows are supplied bottom row first, each padded to `alignment` bytes.
    #[allow(clippy::too_many_arguments)]
    fn write_image(
        &mut self,
        texture: TextureHandle,
        target: ImageTarget,
        rect: Viewport,
        pixels: &[u8],
        format: PixelFormat,
        ty: PixelType,
        alignment: u32,
    );

    /// Build the mipmap chain of a texture from its base level
    fn generate_mipmap(&mut self, texture: TextureHandle, kind: TextureKind);

    /// Set one sampling parameter of a texture
    fn set_texture_parameter(
        &mut self,
        texture: TextureHandle,
        kind: TextureKind,
        parameter: TextureParameter,
    );

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: TextureHandle);

    /// Bind the fixed-pipeline combination environment of a texture unit.
    ///
    /// `None` restores the default environment.
    fn bind_texture_environment(&mut self, unit: u32, environment: Option<&TextureUnit>);

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);
}
