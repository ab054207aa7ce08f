//! Texture factory.
//!
//! [`TextureLibrary`] turns a [`TextureRequest`] into the right concrete
//! texture: a file decodes to a [`Texture2D`], or to a [`TextureCube`] when the
//! decoder finds embedded cube faces; six files or a face pattern always make a
//! cube; raw pixel layouts make whichever kind was asked for. File-based
//! requests go through the [`TextureCache`] under a name derived from the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::backend::traits::SharedBackend;
use crate::backend::types::*;
use crate::config::TextureConfig;
use crate::error::TextureResult;
use crate::resources::cache::TextureCache;
use crate::resources::image::{DecodedFile, FileImageDecoder, ImageDecoder};
use crate::resources::texture::Texture;
use crate::resources::texture_2d::Texture2D;
use crate::resources::texture_cube::{
    cube_face_paths, cube_name_from_pattern, TextureCube, AXES_TEXTURE_NAME,
};
use crate::resources::texture_unit::{TextureUnit, TextureUnitTexture};

/// What to build.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureRequest {
    /// A single file; 2D unless the file holds cube faces.
    File(PathBuf),
    /// Six face files ordered as [`CubeFace::ALL`].
    CubeFiles(Box<[PathBuf; 6]>),
    /// A face pattern such as `"Sky%@.png"`.
    CubePattern(String),
    /// Unallocated texture with a pixel layout; storage comes from `resize_to`.
    PixelFormat {
        kind: TextureKind,
        format: PixelFormat,
        ty: PixelType,
    },
    /// Empty storage of a given size.
    Size {
        kind: TextureKind,
        size: IntSize,
        format: PixelFormat,
        ty: PixelType,
    },
}

impl TextureRequest {
    /// Cache key of a file-based request.
    pub fn cache_name(&self) -> Option<String> {
        match self {
            TextureRequest::File(path) => Some(texture_name_from_file_path(path)),
            TextureRequest::CubeFiles(paths) => Some(texture_name_from_file_path(&paths[0])),
            TextureRequest::CubePattern(pattern) => cube_name_from_pattern(pattern),
            TextureRequest::PixelFormat { .. } | TextureRequest::Size { .. } => None,
        }
    }
}

/// Name of a texture loaded from `path`: its last component.
pub fn texture_name_from_file_path(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Creates textures and owns the texture cache.
pub struct TextureLibrary {
    backend: SharedBackend,
    decoder: Arc<dyn ImageDecoder>,
    config: RwLock<TextureConfig>,
    cache: TextureCache,
}

impl TextureLibrary {
    /// A library decoding files with [`FileImageDecoder`].
    pub fn new(backend: SharedBackend) -> Self {
        Self::with_decoder(backend, Arc::new(FileImageDecoder))
    }

    pub fn with_decoder(backend: SharedBackend, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            backend,
            decoder,
            config: RwLock::new(TextureConfig::default()),
            cache: TextureCache::new(),
        }
    }

    pub fn with_config(self, config: TextureConfig) -> Self {
        *self.config.write() = config;
        self
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> TextureConfig {
        self.config.read().clone()
    }

    /// Change the configuration used for textures created from now on.
    pub fn update_config(&self, update: impl FnOnce(&mut TextureConfig)) {
        update(&mut *self.config.write());
    }

    /// Build the texture a request asks for.
    ///
    /// File-based requests return the cached texture of the same name if
    /// there is one, and cache what they load. Nothing is cached on failure.
    pub fn create(&self, request: TextureRequest) -> TextureResult<Arc<dyn Texture>> {
        let name = request.cache_name();
        if let Some(cached) = name.as_deref().and_then(|n| self.cache.get_named(n)) {
            log::trace!("Texture '{}' served from cache", cached.name().unwrap_or_default());
            return Ok(cached);
        }

        let texture = self.build(request)?;
        if name.is_some() {
            texture.set_name(name);
            self.cache.add_texture(&texture)?;
        }
        Ok(texture)
    }

    fn build(&self, request: TextureRequest) -> TextureResult<Arc<dyn Texture>> {
        let config = self.config();
        let backend = Arc::clone(&self.backend);
        let texture: Arc<dyn Texture> = match request {
            TextureRequest::File(path) => return self.load_with(&config, &path),
            TextureRequest::CubeFiles(paths) => {
                let paths = (*paths).map(|p| config.resolve_path(p));
                Arc::new(TextureCube::from_files(
                    backend,
                    &config,
                    self.decoder.as_ref(),
                    &paths,
                )?)
            }
            TextureRequest::CubePattern(pattern) => {
                let paths = cube_face_paths(&pattern)?.map(|p| config.resolve_path(p));
                Arc::new(TextureCube::from_files(
                    backend,
                    &config,
                    self.decoder.as_ref(),
                    &paths,
                )?)
            }
            TextureRequest::PixelFormat { kind, format, ty } => match kind {
                TextureKind::Texture2D => {
                    Arc::new(Texture2D::with_pixel_format(backend, &config, format, ty))
                }
                TextureKind::Cube => {
                    Arc::new(TextureCube::with_pixel_format(backend, &config, format, ty))
                }
            },
            TextureRequest::Size {
                kind,
                size,
                format,
                ty,
            } => match kind {
                TextureKind::Texture2D => {
                    Arc::new(Texture2D::with_size(backend, &config, size, format, ty)?)
                }
                TextureKind::Cube => {
                    let texture = TextureCube::with_pixel_format(backend, &config, format, ty);
                    texture.resize_to(size)?;
                    Arc::new(texture)
                }
            },
        };
        Ok(texture)
    }

    fn load_with(&self, config: &TextureConfig, path: &Path) -> TextureResult<Arc<dyn Texture>> {
        let resolved = config.resolve_path(path);
        let decoded = self.decoder.decode(&resolved).inspect_err(|err| {
            log::warn!("Could not load texture {}: {}", resolved.display(), err);
        })?;
        let backend = Arc::clone(&self.backend);
        let texture: Arc<dyn Texture> = match decoded {
            DecodedFile::Single(image) => Arc::new(Texture2D::from_image(backend, config, image)?),
            DecodedFile::Cube(faces) => Arc::new(TextureCube::from_faces(backend, config, *faces)?),
        };
        texture.set_name(Some(texture_name_from_file_path(path)));
        log::debug!(
            "Loaded {:?} '{}' from {}",
            texture.class(),
            texture_name_from_file_path(path),
            resolved.display()
        );
        Ok(texture)
    }

    /// Load a file through the cache.
    pub fn texture_from_file(&self, path: impl AsRef<Path>) -> TextureResult<Arc<dyn Texture>> {
        self.create(TextureRequest::File(path.as_ref().to_path_buf()))
    }

    /// Load a file without consulting or filling the cache.
    pub fn load_texture_from_file(
        &self,
        path: impl AsRef<Path>,
    ) -> TextureResult<Arc<dyn Texture>> {
        self.load_with(&self.config(), path.as_ref())
    }

    pub fn texture_with_pixel_format(
        &self,
        format: PixelFormat,
        ty: PixelType,
    ) -> TextureResult<Arc<dyn Texture>> {
        self.create(TextureRequest::PixelFormat {
            kind: TextureKind::Texture2D,
            format,
            ty,
        })
    }

    pub fn texture_with_size(
        &self,
        size: IntSize,
        format: PixelFormat,
        ty: PixelType,
    ) -> TextureResult<Arc<dyn Texture>> {
        self.create(TextureRequest::Size {
            kind: TextureKind::Texture2D,
            size,
            format,
            ty,
        })
    }

    /// A 2D texture filled with one color. Not cached.
    pub fn texture_with_color(
        &self,
        size: IntSize,
        color: Color4B,
    ) -> TextureResult<Arc<dyn Texture>> {
        let texture = Texture2D::with_color(Arc::clone(&self.backend), &self.config(), size, color)?;
        Ok(Arc::new(texture))
    }

    /// Load six face files through the cache, named after the +X file.
    pub fn texture_cube_from_files<P: AsRef<Path>>(
        &self,
        paths: &[P; 6],
    ) -> TextureResult<Arc<dyn Texture>> {
        let paths = Box::new(paths.each_ref().map(|p| p.as_ref().to_path_buf()));
        self.create(TextureRequest::CubeFiles(paths))
    }

    /// Load the six files of a face pattern through the cache.
    ///
    /// `"Tex%@.png"` loads `TexPosX.png` .. `TexNegZ.png` and is named `"Tex.png"`.
    pub fn texture_cube_from_file_pattern(&self, pattern: &str) -> TextureResult<Arc<dyn Texture>> {
        self.create(TextureRequest::CubePattern(pattern.to_string()))
    }

    pub fn texture_cube_with_pixel_format(
        &self,
        format: PixelFormat,
        ty: PixelType,
    ) -> TextureResult<Arc<dyn Texture>> {
        self.create(TextureRequest::PixelFormat {
            kind: TextureKind::Cube,
            format,
            ty,
        })
    }

    pub fn texture_cube_with_side_length(
        &self,
        side_length: u32,
        format: PixelFormat,
        ty: PixelType,
    ) -> TextureResult<Arc<dyn Texture>> {
        self.create(TextureRequest::Size {
            kind: TextureKind::Cube,
            size: IntSize::square(side_length),
            format,
            ty,
        })
    }

    /// The axis-colored debug cube, shared through the cache.
    pub fn texture_cube_colored_for_axes(&self) -> TextureResult<Arc<dyn Texture>> {
        if let Some(cached) = self.cache.get_named(AXES_TEXTURE_NAME) {
            return Ok(cached);
        }
        let cube: Arc<dyn Texture> = Arc::new(TextureCube::colored_for_axes(
            Arc::clone(&self.backend),
            &self.config(),
        )?);
        self.cache.add_texture(&cube)?;
        Ok(cube)
    }

    /// Wrap a texture in a decorator carrying its own texture unit.
    pub fn texture_unit_texture(
        &self,
        texture: Arc<dyn Texture>,
        texture_unit: Option<TextureUnit>,
    ) -> Arc<dyn Texture> {
        let decorated = TextureUnitTexture::new(texture);
        decorated.set_texture_unit(texture_unit);
        Arc::new(decorated)
    }
}

impl std::fmt::Debug for TextureLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureLibrary")
            .field("backend", &self.backend.lock().name())
            .field("config", &*self.config.read())
            .field("cache", &self.cache)
            .finish()
    }
}

static_assertions::assert_impl_all!(TextureLibrary: Send, Sync);
