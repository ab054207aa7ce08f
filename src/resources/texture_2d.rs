//! Single-image 2D textures.

use std::path::Path;

use crate::backend::traits::SharedBackend;
use crate::backend::types::*;
use crate::config::TextureConfig;
use crate::error::{TextureError, TextureResult};
use crate::resources::image::{DecodedFile, DecodedImage, ImageDecoder};
use crate::resources::texture::TextureClass;
use crate::resources::texture_core::{impl_texture_via_core, TextureCore};

/// A 2D texture.
#[derive(Debug)]
pub struct Texture2D {
    core: TextureCore,
}

impl Texture2D {
    /// An unallocated texture using the 2D defaults of `config`.
    pub fn new(backend: SharedBackend, config: &TextureConfig) -> Self {
        Self {
            core: TextureCore::new(TextureKind::Texture2D, backend, config),
        }
    }

    /// An unallocated texture that will store texels as `(format, ty)`.
    ///
    /// Storage is created by a later [`resize_to`](crate::resources::Texture::resize_to).
    pub fn with_pixel_format(
        backend: SharedBackend,
        config: &TextureConfig,
        format: PixelFormat,
        ty: PixelType,
    ) -> Self {
        let texture = Self::new(backend, config);
        texture.core.set_pixel_layout(format, ty);
        texture
    }

    /// Empty storage of the given size and layout.
    pub fn with_size(
        backend: SharedBackend,
        config: &TextureConfig,
        size: IntSize,
        format: PixelFormat,
        ty: PixelType,
    ) -> TextureResult<Self> {
        let texture = Self::with_pixel_format(backend, config, format, ty);
        texture.core.resize_to(size)?;
        Ok(texture)
    }

    /// A texture filled with one color. No mipmap is generated.
    pub fn with_color(
        backend: SharedBackend,
        config: &TextureConfig,
        size: IntSize,
        color: Color4B,
    ) -> TextureResult<Self> {
        let texture = Self::new(backend, config);
        let image = texture
            .core
            .upload_image(DecodedImage::solid(size, color), ImageTarget::Texture2D)?;
        texture.core.finish_load(false, Some(image));
        Ok(texture)
    }

    /// Upload already decoded content.
    pub fn from_image(
        backend: SharedBackend,
        config: &TextureConfig,
        image: DecodedImage,
    ) -> TextureResult<Self> {
        let texture = Self::new(backend, config);
        texture.load_image(image)?;
        Ok(texture)
    }

    /// Decode and upload a file, naming the texture after it.
    pub fn from_file(
        backend: SharedBackend,
        config: &TextureConfig,
        decoder: &dyn ImageDecoder,
        path: impl AsRef<Path>,
    ) -> TextureResult<Self> {
        let texture = Self::new(backend, config);
        texture.load_from_file(decoder, path)?;
        Ok(texture)
    }

    /// Decode and upload a file into this texture.
    ///
    /// Names the texture after the file if it has no name yet. On failure the
    /// texture is left in the [`Failed`](crate::resources::TextureState::Failed) state.
    pub fn load_from_file(
        &self,
        decoder: &dyn ImageDecoder,
        path: impl AsRef<Path>,
    ) -> TextureResult<()> {
        let path = path.as_ref();
        if self.core.name().is_none() {
            self.core.set_name(file_name(path));
        }
        let image = match decoder.decode(path) {
            Ok(DecodedFile::Single(image)) => image,
            Ok(DecodedFile::Cube(_)) => {
                self.core.mark_failed();
                return Err(TextureError::LoadFailed {
                    path: path.to_path_buf(),
                    reason: "file holds cube-map faces".to_string(),
                });
            }
            Err(err) => {
                log::warn!("Could not load texture {}: {}", path.display(), err);
                self.core.mark_failed();
                return Err(err);
            }
        };
        self.load_image(image)
    }

    fn load_image(&self, image: DecodedImage) -> TextureResult<()> {
        let image = self
            .core
            .upload_image(image, ImageTarget::Texture2D)
            .map_err(|err| {
                self.core.mark_failed();
                err
            })?;
        self.core.finish_load(true, Some(image));
        Ok(())
    }
}

impl_texture_via_core!(Texture2D, TextureClass::Texture2D, {
    fn bind_content(&self, image: DecodedImage, target: ImageTarget) -> TextureResult<()> {
        if target != ImageTarget::Texture2D {
            return Err(TextureError::InvalidTarget {
                target,
                kind: TextureKind::Texture2D,
            });
        }
        self.load_image(image)
    }
});

/// Last component of a path, used as a texture name.
pub(crate) fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
