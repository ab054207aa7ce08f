//! Six-faced cube-map textures.

use std::path::{Path, PathBuf};

use crate::backend::traits::SharedBackend;
use crate::backend::types::*;
use crate::config::TextureConfig;
use crate::error::{TextureError, TextureResult};
use crate::resources::image::{face_error, DecodedFile, DecodedImage, ImageDecoder};
use crate::resources::texture::TextureClass;
use crate::resources::texture_2d::file_name;
use crate::resources::texture_core::{impl_texture_via_core, TextureCore};

/// Placeholder replaced by a face token in cube file patterns.
pub const FACE_PLACEHOLDER: &str = "%@";

/// Name of the cube built by [`TextureCube::colored_for_axes`].
pub const AXES_TEXTURE_NAME: &str = "Axes";

/// A cube-map texture.
#[derive(Debug)]
pub struct TextureCube {
    core: TextureCore,
}

impl TextureCube {
    /// An unallocated texture using the cube defaults of `config`.
    pub fn new(backend: SharedBackend, config: &TextureConfig) -> Self {
        Self {
            core: TextureCore::new(TextureKind::Cube, backend, config),
        }
    }

    /// An unallocated cube that will store texels as `(format, ty)`.
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

    /// Empty square faces of the given side length.
    pub fn with_side_length(
        backend: SharedBackend,
        config: &TextureConfig,
        side_length: u32,
        format: PixelFormat,
        ty: PixelType,
    ) -> TextureResult<Self> {
        let texture = Self::with_pixel_format(backend, config, format, ty);
        texture.core.resize_to(IntSize::square(side_length))?;
        Ok(texture)
    }

    /// A 1x1 cube with a distinct color on each face.
    ///
    /// +X red, -X cyan, +Y green, -Y magenta, +Z blue, -Z yellow. Handy for
    /// checking cube-map orientation. No mipmap is generated.
    pub fn colored_for_axes(backend: SharedBackend, config: &TextureConfig) -> TextureResult<Self> {
        let texture = Self::new(backend, config);
        texture.core.set_name(Some(AXES_TEXTURE_NAME.to_string()));
        for face in CubeFace::ALL {
            let image = DecodedImage::solid(IntSize::square(1), axis_color(face));
            texture.core.upload_image(image, ImageTarget::Face(face))?;
        }
        texture.core.finish_load(false, None);
        Ok(texture)
    }

    /// Upload six decoded faces, ordered as [`CubeFace::ALL`].
    pub fn from_faces(
        backend: SharedBackend,
        config: &TextureConfig,
        faces: [DecodedImage; 6],
    ) -> TextureResult<Self> {
        let texture = Self::new(backend, config);
        texture.load_faces(faces)?;
        Ok(texture)
    }

    /// Decode and upload six face files, ordered as [`CubeFace::ALL`].
    ///
    /// Named after the +X file.
    pub fn from_files<P: AsRef<Path>>(
        backend: SharedBackend,
        config: &TextureConfig,
        decoder: &dyn ImageDecoder,
        paths: &[P; 6],
    ) -> TextureResult<Self> {
        let texture = Self::new(backend, config);
        texture.load_from_files(decoder, paths)?;
        Ok(texture)
    }

    /// Decode and upload the six files produced by a face pattern.
    ///
    /// See [`cube_face_paths`] and [`cube_name_from_pattern`].
    pub fn from_file_pattern(
        backend: SharedBackend,
        config: &TextureConfig,
        decoder: &dyn ImageDecoder,
        pattern: &str,
    ) -> TextureResult<Self> {
        let paths = cube_face_paths(pattern)?;
        let texture = Self::new(backend, config);
        texture.core.set_name(cube_name_from_pattern(pattern));
        texture.load_from_files(decoder, &paths)?;
        Ok(texture)
    }

    /// Decode all six files, then upload them.
    ///
    /// Nothing is uploaded unless every face decodes.
    pub fn load_from_files<P: AsRef<Path>>(
        &self,
        decoder: &dyn ImageDecoder,
        paths: &[P; 6],
    ) -> TextureResult<()> {
        if self.core.name().is_none() {
            self.core.set_name(file_name(paths[0].as_ref()));
        }
        let mut faces = Vec::with_capacity(6);
        for (face, path) in CubeFace::ALL.into_iter().zip(paths) {
            let path = path.as_ref();
            match decode_single(decoder, path) {
                Ok(image) => faces.push(image),
                Err(err) => {
                    log::warn!("Could not load {:?} cube face {}: {}", face, path.display(), err);
                    self.core.mark_failed();
                    return Err(face_error(face, path.to_path_buf(), err));
                }
            }
        }
        let faces: [DecodedImage; 6] = faces
            .try_into()
            .map_err(|_| TextureError::MismatchedCubeFaces(Vec::new()))?;
        self.load_faces(faces)
    }

    /// Upload six decoded faces, ordered as [`CubeFace::ALL`].
    pub fn load_faces(&self, faces: [DecodedImage; 6]) -> TextureResult<()> {
        let sizes: Vec<IntSize> = faces.iter().map(DecodedImage::size).collect();
        let first = sizes[0];
        if first.width != first.height || sizes.iter().any(|s| *s != first) {
            self.core.mark_failed();
            return Err(TextureError::MismatchedCubeFaces(sizes));
        }
        for (face, image) in CubeFace::ALL.into_iter().zip(faces) {
            if let Err(err) = self.core.upload_image(image, ImageTarget::Face(face)) {
                self.core.mark_failed();
                return Err(err);
            }
        }
        self.core.finish_load(true, None);
        Ok(())
    }

    /// Decode and upload one face file. Never generates a mipmap.
    pub fn load_cube_face(
        &self,
        decoder: &dyn ImageDecoder,
        face: CubeFace,
        path: impl AsRef<Path>,
    ) -> TextureResult<()> {
        let path = path.as_ref();
        if self.core.name().is_none() {
            self.core.set_name(file_name(path));
        }
        let image =
            decode_single(decoder, path).map_err(|e| face_error(face, path.to_path_buf(), e))?;
        self.upload_face(image, face)
    }

    fn upload_face(&self, image: DecodedImage, face: CubeFace) -> TextureResult<()> {
        if let Err(err) = self.core.upload_image(image, ImageTarget::Face(face)) {
            self.core.mark_failed();
            return Err(err);
        }
        self.core.finish_load(false, None);
        Ok(())
    }
}

impl_texture_via_core!(TextureCube, TextureClass::TextureCube, {
    fn bind_content(&self, image: DecodedImage, target: ImageTarget) -> TextureResult<()> {
        match target {
            ImageTarget::Face(face) => self.upload_face(image, face),
            ImageTarget::Texture2D => Err(TextureError::InvalidTarget {
                target,
                kind: TextureKind::Cube,
            }),
        }
    }
});

fn decode_single(decoder: &dyn ImageDecoder, path: &Path) -> TextureResult<DecodedImage> {
    match decoder.decode(path)? {
        DecodedFile::Single(image) => Ok(image),
        DecodedFile::Cube(_) => Err(TextureError::LoadFailed {
            path: path.to_path_buf(),
            reason: "expected a single face image".to_string(),
        }),
    }
}

/// Color of a face in [`TextureCube::colored_for_axes`].
pub fn axis_color(face: CubeFace) -> Color4B {
    match face {
        CubeFace::PositiveX => Color4B::RED,
        CubeFace::NegativeX => Color4B::CYAN,
        CubeFace::PositiveY => Color4B::GREEN,
        CubeFace::NegativeY => Color4B::MAGENTA,
        CubeFace::PositiveZ => Color4B::BLUE,
        CubeFace::NegativeZ => Color4B::YELLOW,
    }
}

/// Expand a pattern such as `"Sky%@.png"` into the six face file paths.
pub fn cube_face_paths(pattern: &str) -> TextureResult<[PathBuf; 6]> {
    if !pattern.contains(FACE_PLACEHOLDER) {
        return Err(TextureError::MissingFacePlaceholder(pattern.to_string()));
    }
    Ok(CubeFace::ALL.map(|face| {
        PathBuf::from(pattern.replacen(FACE_PLACEHOLDER, face.file_token(), 1))
    }))
}

/// Name of a cube loaded from a pattern: its last path component with the
/// placeholder removed, so `"maps/Sky%@.png"` is named `"Sky.png"`.
pub fn cube_name_from_pattern(pattern: &str) -> Option<String> {
    file_name(Path::new(pattern)).map(|name| name.replacen(FACE_PLACEHOLDER, "", 1))
}
