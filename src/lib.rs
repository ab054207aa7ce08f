//! # Texture Engine
//!
//! GPU texture management for a 3D rendering engine.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Texture`] - Shared interface of every texture variant
//! - [`Texture2D`] and [`TextureCube`] - Single-image and six-faced textures
//! - [`TextureUnitTexture`] - A texture carrying its own fixed-pipeline texture unit
//! - [`TextureCache`] - Name-keyed cache with strong (preloaded) and weak entries
//! - [`TextureLibrary`] - Factory picking the right variant for a file or pixel layout
//! - [`GraphicsBackend`] - The graphics-context sink textures upload to, plus a
//!   [`DummyBackend`] for testing
//!
//! ## Example
//!
//! ```ignore
//! use texture_engine::{share_backend, DummyBackend, Texture, TextureLibrary};
//!
//! let library = TextureLibrary::new(share_backend(DummyBackend::new()));
//! let stone = library.texture_from_file("textures/stone.png")?;
//! let sky = library.texture_cube_from_file_pattern("textures/Sky%@.png")?;
//! assert!(stone.is_texture_2d() && sky.is_texture_cube());
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod resources;

pub use backend::{
    share_backend, BackendError, DummyBackend, GraphicsBackend, SharedBackend, TextureHandle,
};
pub use backend::{
    Color4B, CubeFace, ImageTarget, IntSize, MagFilter, MinFilter, PixelFormat, PixelType,
    SamplerSemantic, TextureKind, TextureParameters, Viewport, WrapMode,
};
pub use config::{TextureConfig, TextureDefaults};
pub use error::{TextureError, TextureResult};
pub use resources::{
    DecodedFile, DecodedImage, DrawingVisitor, FileImageDecoder, ImageDecoder, Texture,
    Texture2D, TextureCache, TextureClass, TextureCube, TextureLibrary, TextureState,
    TextureUnit, TextureUnitCounter, TextureUnitTexture,
};

/// Texture engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the texture subsystem.
pub fn init() {
    log::info!("Texture Engine v{} initialized", VERSION);
}

static_assertions::assert_impl_all!(Texture2D: Send, Sync);
static_assertions::assert_impl_all!(TextureCube: Send, Sync);
static_assertions::assert_impl_all!(TextureUnitTexture: Send, Sync);
