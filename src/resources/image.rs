//! Decoded image content and the decoders that produce it.
//!
//! A [`DecodedImage`] is an in-memory pixel buffer plus the metadata needed to
//! upload it: physical size, content size, native pixel layout and the
//! alpha/orientation flags reported by the decoder. Rows are stored in the
//! order the decoder produced them; `is_upside_down` records whether that
//! order is top row first (upside down for the rendering API).

use std::path::{Path, PathBuf};

use glam::Vec2;
use image::DynamicImage;

use crate::backend::types::{Color4B, CubeFace, IntSize};
use crate::error::{TextureError, TextureResult};
use crate::resources::pixel_format::ContentPixelFormat;

/// Decoded pixel buffer of a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pixels: Vec<u8>,
    size: IntSize,
    content_size: IntSize,
    pixel_format: ContentPixelFormat,
    has_alpha: bool,
    has_premultiplied_alpha: bool,
    is_upside_down: bool,
    has_mipmap: bool,
}

impl DecodedImage {
    /// Wrap a tightly packed pixel buffer.
    ///
    /// Returns `None` if the buffer length does not match the size and format.
    pub fn new(size: IntSize, pixel_format: ContentPixelFormat, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != size.area() * pixel_format.bytes_per_pixel() as usize {
            return None;
        }
        Some(Self {
            pixels,
            size,
            content_size: size,
            pixel_format,
            has_alpha: pixel_format.has_alpha(),
            has_premultiplied_alpha: false,
            is_upside_down: false,
            has_mipmap: false,
        })
    }

    /// A zero-filled buffer of the given size and layout.
    pub fn empty(size: IntSize, pixel_format: ContentPixelFormat) -> Self {
        let len = size.area() * pixel_format.bytes_per_pixel() as usize;
        Self {
            pixels: vec![0; len],
            size,
            content_size: size,
            pixel_format,
            has_alpha: pixel_format.has_alpha(),
            has_premultiplied_alpha: false,
            is_upside_down: false,
            has_mipmap: false,
        }
    }

    /// A 32-bit RGBA buffer filled with one color.
    pub fn solid(size: IntSize, color: Color4B) -> Self {
        let pixels = color.to_array().repeat(size.area());
        Self {
            pixels,
            size,
            content_size: size,
            pixel_format: ContentPixelFormat::Rgba8888,
            has_alpha: color.a != 255,
            has_premultiplied_alpha: false,
            is_upside_down: false,
            has_mipmap: false,
        }
    }

    /// Convert an image decoded by the `image` crate, keeping 8-bit layouts
    /// as they are and widening everything else to RGBA8888.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let has_alpha = image.color().has_alpha();
        let size = IntSize::new(image.width(), image.height());
        let (pixel_format, pixels) = match image {
            DynamicImage::ImageLuma8(buf) => (ContentPixelFormat::I8, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (ContentPixelFormat::Ai88, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (ContentPixelFormat::Rgb888, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (ContentPixelFormat::Rgba8888, buf.into_raw()),
            other => (ContentPixelFormat::Rgba8888, other.into_rgba8().into_raw()),
        };
        Self {
            pixels,
            size,
            content_size: size,
            pixel_format,
            has_alpha,
            has_premultiplied_alpha: false,
            // Image files store the top row first.
            is_upside_down: true,
            has_mipmap: false,
        }
    }

    pub fn with_upside_down(mut self, is_upside_down: bool) -> Self {
        self.is_upside_down = is_upside_down;
        self
    }

    pub fn with_premultiplied_alpha(mut self, premultiplied: bool) -> Self {
        self.has_premultiplied_alpha = premultiplied;
        self
    }

    /// Mark the content as carrying its own mipmap levels.
    pub fn with_embedded_mipmap(mut self, has_mipmap: bool) -> Self {
        self.has_mipmap = has_mipmap;
        self
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn has_image_data(&self) -> bool {
        !self.pixels.is_empty()
    }

    /// Physical size of the pixel buffer.
    pub fn size(&self) -> IntSize {
        self.size
    }

    /// Size of the real image within the physical buffer.
    pub fn content_size(&self) -> IntSize {
        self.content_size
    }

    /// Fraction of the physical buffer covered by real content.
    pub fn coverage(&self) -> Vec2 {
        if self.size.is_empty() {
            return Vec2::ONE;
        }
        Vec2::new(
            self.content_size.width as f32 / self.size.width as f32,
            self.content_size.height as f32 / self.size.height as f32,
        )
    }

    pub fn pixel_format(&self) -> ContentPixelFormat {
        self.pixel_format
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn has_premultiplied_alpha(&self) -> bool {
        self.has_premultiplied_alpha
    }

    pub fn is_upside_down(&self) -> bool {
        self.is_upside_down
    }

    pub fn has_mipmap(&self) -> bool {
        self.has_mipmap
    }

    fn row_len(&self) -> usize {
        self.size.width as usize * self.pixel_format.bytes_per_pixel() as usize
    }

    /// Reverse the order of the rows. Toggles `is_upside_down`.
    pub fn flip_vertically(&mut self) {
        let row_len = self.row_len();
        let rows = self.size.height as usize;
        if self.has_image_data() && row_len > 0 {
            for top in 0..rows / 2 {
                let bottom = rows - 1 - top;
                let (head, tail) = self.pixels.split_at_mut(bottom * row_len);
                head[top * row_len..(top + 1) * row_len].swap_with_slice(&mut tail[..row_len]);
            }
        }
        self.is_upside_down = !self.is_upside_down;
    }

    /// Reverse the order of the pixels within each row.
    pub fn flip_horizontally(&mut self) {
        let bpp = self.pixel_format.bytes_per_pixel() as usize;
        let row_len = self.row_len();
        if !self.has_image_data() || row_len == 0 {
            return;
        }
        for row in self.pixels.chunks_exact_mut(row_len) {
            reverse_pixels(row, bpp);
        }
    }

    /// Rotate by 180 degrees in a single pass. Toggles `is_upside_down`.
    pub fn rotate_half_circle(&mut self) {
        let bpp = self.pixel_format.bytes_per_pixel() as usize;
        if self.has_image_data() {
            reverse_pixels(&mut self.pixels, bpp);
        }
        self.is_upside_down = !self.is_upside_down;
    }

    /// Change the dimensions, discarding the pixel data.
    pub fn resize_to(&mut self, size: IntSize) {
        self.size = size;
        self.content_size = size;
        self.delete_image_data();
    }

    /// Free the pixel buffer, keeping the metadata.
    pub fn delete_image_data(&mut self) {
        self.pixels = Vec::new();
    }

    /// Grow the physical buffer to power-of-two dimensions.
    ///
    /// Content keeps its rows and columns starting at the origin; the padding
    /// is zero-filled and the coverage drops below one.
    pub fn pad_to_power_of_two(&mut self) {
        let padded = self.size.next_pot();
        if padded == self.size || !self.has_image_data() {
            return;
        }
        let bpp = self.pixel_format.bytes_per_pixel() as usize;
        let src_row = self.row_len();
        let dst_row = padded.width as usize * bpp;
        let mut pixels = vec![0; padded.area() * bpp];
        for (row, src) in self.pixels.chunks_exact(src_row).enumerate() {
            pixels[row * dst_row..row * dst_row + src_row].copy_from_slice(src);
        }
        log::debug!(
            "Padded image from {}x{} to {}x{}",
            self.size.width,
            self.size.height,
            padded.width,
            padded.height
        );
        self.pixels = pixels;
        self.content_size = self.size;
        self.size = padded;
    }
}

fn reverse_pixels(bytes: &mut [u8], bpp: usize) {
    let count = bytes.len() / bpp;
    for i in 0..count / 2 {
        let j = count - 1 - i;
        let (head, tail) = bytes.split_at_mut(j * bpp);
        head[i * bpp..(i + 1) * bpp].swap_with_slice(&mut tail[..bpp]);
    }
}

/// The content of one decoded file.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFile {
    Single(DecodedImage),
    /// Six embedded cube faces, indexed by [`CubeFace::index`].
    Cube(Box<[DecodedImage; 6]>),
}

impl DecodedFile {
    pub fn cube(faces: [DecodedImage; 6]) -> Self {
        Self::Cube(Box::new(faces))
    }

    pub fn is_cube(&self) -> bool {
        matches!(self, Self::Cube(_))
    }
}

/// Decodes files into pixel buffers.
///
/// Implementations may run on any thread; uploading the result must happen
/// on the thread owning the graphics context.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> TextureResult<DecodedFile>;
}

/// Decoder for common image files, backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageDecoder;

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, path: &Path) -> TextureResult<DecodedFile> {
        let image = image::open(path).map_err(|e| TextureError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        log::debug!(
            "Decoded {} ({}x{}, {:?})",
            path.display(),
            image.width(),
            image.height(),
            image.color()
        );
        Ok(DecodedFile::Single(DecodedImage::from_dynamic(image)))
    }
}

/// Attach the cube face a failed decode belongs to.
pub(crate) fn face_error(face: CubeFace, path: PathBuf, err: TextureError) -> TextureError {
    let reason = match err {
        TextureError::LoadFailed { reason, .. } => reason,
        other => other.to_string(),
    };
    TextureError::CubeFaceLoadFailed { face, path, reason }
}
