//! Pixel format table.
//!
//! Maps the native pixel layout of decoded image content
//! ([`ContentPixelFormat`]) to the rendering API's `(format, type)` pair and
//! back, and converts standard 32-bit RGBA texels into any supported pair.
//!
//! The mapping is lossy in one direction: [`ContentPixelFormat::Automatic`]
//! resolves to the same pair as [`ContentPixelFormat::Rgba8888`], so the pair
//! always maps back to `Rgba8888`.

use crate::backend::types::{Color4B, PixelFormat, PixelType};
use crate::error::{TextureError, TextureResult};

/// Native pixel layout of decoded image content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentPixelFormat {
    /// Whatever the loader picks by default; resolved as `Rgba8888`.
    Automatic,
    #[default]
    Rgba8888,
    Rgb888,
    Rgb565,
    Rgba4444,
    Rgb5a1,
    /// 8-bit alpha only.
    A8,
    /// 8-bit intensity (luminance).
    I8,
    /// 8-bit intensity with 8-bit alpha.
    Ai88,
}

impl ContentPixelFormat {
    /// Rendering API pixel format for this layout.
    pub fn gl_format(&self) -> PixelFormat {
        match self {
            Self::Automatic | Self::Rgba8888 | Self::Rgba4444 | Self::Rgb5a1 => PixelFormat::Rgba,
            Self::Rgb888 | Self::Rgb565 => PixelFormat::Rgb,
            Self::A8 => PixelFormat::Alpha,
            Self::I8 => PixelFormat::Luminance,
            Self::Ai88 => PixelFormat::LuminanceAlpha,
        }
    }

    /// Rendering API pixel type for this layout.
    pub fn gl_type(&self) -> PixelType {
        match self {
            Self::Rgb565 => PixelType::UnsignedShort565,
            Self::Rgba4444 => PixelType::UnsignedShort4444,
            Self::Rgb5a1 => PixelType::UnsignedShort5551,
            Self::Automatic
            | Self::Rgba8888
            | Self::Rgb888
            | Self::A8
            | Self::I8
            | Self::Ai88 => PixelType::UnsignedByte,
        }
    }

    /// Layout matching a `(format, type)` pair, if one exists.
    pub fn from_gl(format: PixelFormat, ty: PixelType) -> Option<Self> {
        match (format, ty) {
            (PixelFormat::Rgba, PixelType::UnsignedByte) => Some(Self::Rgba8888),
            (PixelFormat::Rgba, PixelType::UnsignedShort4444) => Some(Self::Rgba4444),
            (PixelFormat::Rgba, PixelType::UnsignedShort5551) => Some(Self::Rgb5a1),
            (PixelFormat::Rgb, PixelType::UnsignedByte) => Some(Self::Rgb888),
            (PixelFormat::Rgb, PixelType::UnsignedShort565) => Some(Self::Rgb565),
            (PixelFormat::Alpha, PixelType::UnsignedByte) => Some(Self::A8),
            (PixelFormat::Luminance, PixelType::UnsignedByte) => Some(Self::I8),
            (PixelFormat::LuminanceAlpha, PixelType::UnsignedByte) => Some(Self::Ai88),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        bytes_per_pixel(self.gl_format(), self.gl_type())
    }

    pub fn has_alpha(&self) -> bool {
        !matches!(self, Self::Rgb888 | Self::Rgb565 | Self::I8)
    }
}

/// Size in bytes of one texel of the given `(format, type)` pair.
pub fn bytes_per_pixel(format: PixelFormat, ty: PixelType) -> u32 {
    match ty {
        PixelType::UnsignedByte => format.component_count(),
        PixelType::UnsignedShort565
        | PixelType::UnsignedShort4444
        | PixelType::UnsignedShort5551 => 2,
        PixelType::UnsignedShort => 2 * format.component_count(),
        PixelType::UnsignedInt => 4 * format.component_count(),
        PixelType::UnsignedInt248 => 4,
    }
}

/// Row byte alignment to use when uploading texels of the given pair.
pub fn byte_alignment(format: PixelFormat, ty: PixelType) -> u32 {
    match bytes_per_pixel(format, ty) {
        bpp @ (1 | 2 | 4 | 8) => bpp,
        _ => 1,
    }
}

fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

/// Converts tightly packed 32-bit RGBA texels, in place, into `(format, type)`.
///
/// Every supported target is at most 32 bits per texel, so the converted
/// texels always fit in the front of the same buffer. Returns the number of
/// leading bytes now holding converted texels.
pub fn convert_rgba8888_in_place(
    pixels: &mut [u8],
    format: PixelFormat,
    ty: PixelType,
) -> TextureResult<usize> {
    let content = ContentPixelFormat::from_gl(format, ty)
        .ok_or(TextureError::UnsupportedPixelFormat { format, ty })?;
    let count = pixels.len() / 4;
    if matches!(content, ContentPixelFormat::Rgba8888) {
        return Ok(count * 4);
    }

    let bpp = content.bytes_per_pixel() as usize;
    for i in 0..count {
        let [r, g, b, a] = [
            pixels[4 * i],
            pixels[4 * i + 1],
            pixels[4 * i + 2],
            pixels[4 * i + 3],
        ];
        let dst = &mut pixels[bpp * i..bpp * (i + 1)];
        match content {
            ContentPixelFormat::Automatic | ContentPixelFormat::Rgba8888 => {
                dst.copy_from_slice(&[r, g, b, a])
            }
            ContentPixelFormat::Rgb888 => dst.copy_from_slice(&[r, g, b]),
            ContentPixelFormat::Rgb565 => {
                let packed = ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3);
                dst.copy_from_slice(&packed.to_ne_bytes());
            }
            ContentPixelFormat::Rgba4444 => {
                let packed = ((r as u16 >> 4) << 12)
                    | ((g as u16 >> 4) << 8)
                    | ((b as u16 >> 4) << 4)
                    | (a as u16 >> 4);
                dst.copy_from_slice(&packed.to_ne_bytes());
            }
            ContentPixelFormat::Rgb5a1 => {
                let packed = ((r as u16 >> 3) << 11)
                    | ((g as u16 >> 3) << 6)
                    | ((b as u16 >> 3) << 1)
                    | (a as u16 >> 7);
                dst.copy_from_slice(&packed.to_ne_bytes());
            }
            ContentPixelFormat::A8 => dst[0] = a,
            ContentPixelFormat::I8 => dst[0] = luminance(r, g, b),
            ContentPixelFormat::Ai88 => dst.copy_from_slice(&[luminance(r, g, b), a]),
        }
    }
    Ok(count * bpp)
}

/// Expand 5 or 6 bit channel values back to 8 bits.
fn expand(value: u16, bits: u32) -> u8 {
    let max = (1u16 << bits) - 1;
    ((value as u32 * 255 + max as u32 / 2) / max as u32) as u8
}

/// Decodes texels of `(format, type)` back into 32-bit RGBA.
///
/// Channels absent from the source read as 0 (color) or 255 (alpha);
/// luminance is replicated into red, green and blue.
pub fn unpack_to_rgba8888(
    bytes: &[u8],
    format: PixelFormat,
    ty: PixelType,
) -> TextureResult<Vec<Color4B>> {
    let content = ContentPixelFormat::from_gl(format, ty)
        .ok_or(TextureError::UnsupportedPixelFormat { format, ty })?;
    let bpp = content.bytes_per_pixel() as usize;
    let colors = bytes
        .chunks_exact(bpp)
        .map(|px| match content {
            ContentPixelFormat::Automatic | ContentPixelFormat::Rgba8888 => {
                Color4B::new(px[0], px[1], px[2], px[3])
            }
            ContentPixelFormat::Rgb888 => Color4B::new(px[0], px[1], px[2], 255),
            ContentPixelFormat::Rgb565 => {
                let v = u16::from_ne_bytes([px[0], px[1]]);
                Color4B::new(
                    expand(v >> 11, 5),
                    expand((v >> 5) & 0x3f, 6),
                    expand(v & 0x1f, 5),
                    255,
                )
            }
            ContentPixelFormat::Rgba4444 => {
                let v = u16::from_ne_bytes([px[0], px[1]]);
                let nibble = |shift: u16| ((v >> shift) & 0xf) as u8 * 17;
                Color4B::new(nibble(12), nibble(8), nibble(4), nibble(0))
            }
            ContentPixelFormat::Rgb5a1 => {
                let v = u16::from_ne_bytes([px[0], px[1]]);
                Color4B::new(
                    expand(v >> 11, 5),
                    expand((v >> 6) & 0x1f, 5),
                    expand((v >> 1) & 0x1f, 5),
                    if v & 1 == 1 { 255 } else { 0 },
                )
            }
            ContentPixelFormat::A8 => Color4B::new(0, 0, 0, px[0]),
            ContentPixelFormat::I8 => Color4B::new(px[0], px[0], px[0], 255),
            ContentPixelFormat::Ai88 => Color4B::new(px[0], px[0], px[0], px[1]),
        })
        .collect();
    Ok(colors)
}
