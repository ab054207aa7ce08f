//! Common types shared between the texture layer and graphics backends

use bytemuck::{Pod, Zeroable};

/// Pixel format of texel data as understood by the rendering API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Rgba,
    Rgb,
    Alpha,
    Luminance,
    LuminanceAlpha,
    DepthComponent,
    DepthStencil,
}

impl PixelFormat {
    /// Number of components carried by one texel of this format.
    pub fn component_count(&self) -> u32 {
        match self {
            PixelFormat::Rgba => 4,
            PixelFormat::Rgb => 3,
            PixelFormat::LuminanceAlpha | PixelFormat::DepthStencil => 2,
            PixelFormat::Alpha | PixelFormat::Luminance | PixelFormat::DepthComponent => 1,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelFormat::Rgba | PixelFormat::Alpha | PixelFormat::LuminanceAlpha
        )
    }
}

/// Component data type of texel data as understood by the rendering API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelType {
    #[default]
    UnsignedByte,
    UnsignedShort565,
    UnsignedShort4444,
    UnsignedShort5551,
    UnsignedShort,
    UnsignedInt,
    UnsignedInt248,
}

impl PixelType {
    /// Returns true if a single value of this type packs every component of a texel.
    pub fn is_packed(&self) -> bool {
        matches!(
            self,
            PixelType::UnsignedShort565
                | PixelType::UnsignedShort4444
                | PixelType::UnsignedShort5551
                | PixelType::UnsignedInt248
        )
    }
}

/// Face of a cube-map texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces, in the order the rendering API enumerates them.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Token substituted into cube file name patterns for this face.
    pub fn file_token(&self) -> &'static str {
        match self {
            CubeFace::PositiveX => "PosX",
            CubeFace::NegativeX => "NegX",
            CubeFace::PositiveY => "PosY",
            CubeFace::NegativeY => "NegY",
            CubeFace::PositiveZ => "PosZ",
            CubeFace::NegativeZ => "NegZ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            CubeFace::PositiveX => 0,
            CubeFace::NegativeX => 1,
            CubeFace::PositiveY => 2,
            CubeFace::NegativeY => 3,
            CubeFace::PositiveZ => 4,
            CubeFace::NegativeZ => 5,
        }
    }
}

/// GPU binding target of a whole texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Texture2D,
    Cube,
}

impl TextureKind {
    /// Number of images making up a texture of this kind.
    pub fn face_count(&self) -> usize {
        match self {
            TextureKind::Texture2D => 1,
            TextureKind::Cube => 6,
        }
    }

    /// Image targets that must be allocated for a texture of this kind.
    pub fn image_targets(&self) -> Vec<ImageTarget> {
        match self {
            TextureKind::Texture2D => vec![ImageTarget::Texture2D],
            TextureKind::Cube => CubeFace::ALL.iter().copied().map(ImageTarget::Face).collect(),
        }
    }
}

/// Target of a single image upload: the 2D image, or one face of a cube map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Texture2D,
    Face(CubeFace),
}

impl ImageTarget {
    pub fn is_valid_for(&self, kind: TextureKind) -> bool {
        matches!(
            (self, kind),
            (ImageTarget::Texture2D, TextureKind::Texture2D) | (ImageTarget::Face(_), TextureKind::Cube)
        )
    }
}

/// Uniform sampler semantic a texture binds to in shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerSemantic {
    Texture2D,
    TextureCube,
}

/// Minifying filter function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    NearestMipmapLinear,
    #[default]
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl MinFilter {
    pub fn uses_mipmap(&self) -> bool {
        !matches!(self, MinFilter::Nearest | MinFilter::Linear)
    }

    /// The equivalent filter that does not sample from a mipmap.
    pub fn without_mipmap(&self) -> Self {
        match self {
            MinFilter::Nearest | MinFilter::NearestMipmapNearest | MinFilter::NearestMipmapLinear => {
                MinFilter::Nearest
            }
            MinFilter::Linear | MinFilter::LinearMipmapNearest | MinFilter::LinearMipmapLinear => {
                MinFilter::Linear
            }
        }
    }
}

/// Magnifying filter function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MagFilter {
    Nearest,
    #[default]
    Linear,
}

/// Texture coordinate wrapping function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl WrapMode {
    /// Returns true if this mode needs power-of-two dimensions.
    pub fn requires_pot(&self) -> bool {
        matches!(self, WrapMode::Repeat | WrapMode::MirroredRepeat)
    }
}

/// The four sampling parameters of a texture, handled as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureParameters {
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

impl TextureParameters {
    pub const fn new(
        min_filter: MinFilter,
        mag_filter: MagFilter,
        wrap_s: WrapMode,
        wrap_t: WrapMode,
    ) -> Self {
        Self {
            min_filter,
            mag_filter,
            wrap_s,
            wrap_t,
        }
    }

    /// Set both wrap functions.
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self
    }

    pub fn with_filters(mut self, min_filter: MinFilter, mag_filter: MagFilter) -> Self {
        self.min_filter = min_filter;
        self.mag_filter = mag_filter;
        self
    }
}

impl Default for TextureParameters {
    fn default() -> Self {
        Self::new(
            MinFilter::LinearMipmapNearest,
            MagFilter::Linear,
            WrapMode::Repeat,
            WrapMode::Repeat,
        )
    }
}

/// A single texture parameter write sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    MinFilter(MinFilter),
    MagFilter(MagFilter),
    WrapS(WrapMode),
    WrapT(WrapMode),
}

/// Integer pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntSize {
    pub width: u32,
    pub height: u32,
}

impl IntSize {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn is_pot(&self) -> bool {
        is_pot(self.width) && is_pot(self.height)
    }

    /// Smallest power-of-two size that contains this size.
    pub fn next_pot(&self) -> Self {
        Self::new(
            self.width.max(1).next_power_of_two(),
            self.height.max(1).next_power_of_two(),
        )
    }
}

/// Returns true if `value` is a power of two. Zero is not.
pub fn is_pot(value: u32) -> bool {
    value.is_power_of_two()
}

/// Integer rectangle within an image, origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole image of the given size.
    pub const fn from_size(size: IntSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(&self) -> IntSize {
        IntSize::new(self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.size().area()
    }

    /// Returns true if this rectangle lies entirely within an image of `size`.
    pub fn fits_within(&self, size: IntSize) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= size.width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|top| top <= size.height)
    }
}

/// A 32-bit RGBA color, one byte per component.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color4B {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color4B {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const RED: Self = Self::new(255, 0, 0, 255);
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    pub const CYAN: Self = Self::new(0, 255, 255, 255);
    pub const MAGENTA: Self = Self::new(255, 0, 255, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color4B {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pot_sizes() {
        assert!(IntSize::new(64, 64).is_pot());
        assert!(IntSize::new(1, 256).is_pot());
        assert!(!IntSize::new(100, 50).is_pot());
        assert!(!IntSize::ZERO.is_pot());
        assert_eq!(IntSize::new(100, 50).next_pot(), IntSize::new(128, 64));
    }

    #[test]
    fn test_viewport_bounds() {
        let size = IntSize::new(8, 4);
        assert!(Viewport::new(0, 0, 8, 4).fits_within(size));
        assert!(Viewport::new(6, 2, 2, 2).fits_within(size));
        assert!(!Viewport::new(7, 0, 2, 1).fits_within(size));
        assert!(!Viewport::new(0, u32::MAX, 1, 2).fits_within(size));
    }

    #[test]
    fn test_min_filter_without_mipmap() {
        assert_eq!(MinFilter::LinearMipmapNearest.without_mipmap(), MinFilter::Linear);
        assert_eq!(MinFilter::NearestMipmapLinear.without_mipmap(), MinFilter::Nearest);
        assert_eq!(MinFilter::Linear.without_mipmap(), MinFilter::Linear);
    }

    #[test]
    fn test_cube_targets() {
        let targets = TextureKind::Cube.image_targets();
        assert_eq!(targets.len(), 6);
        assert!(targets.iter().all(|t| t.is_valid_for(TextureKind::Cube)));
        assert!(!ImageTarget::Texture2D.is_valid_for(TextureKind::Cube));
    }
}
