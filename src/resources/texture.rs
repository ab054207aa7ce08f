//! The shared texture capability interface.

use std::fmt::Debug;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::backend::traits::TextureHandle;
use crate::backend::types::*;
use crate::error::TextureResult;
use crate::resources::image::DecodedImage;
use crate::resources::pixel_format;
use crate::resources::texture_core::TextureContent;
use crate::resources::texture_unit::TextureUnit;

/// Concrete texture variant, used for class-filtered cache removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureClass {
    Texture2D,
    TextureCube,
    TextureUnit,
}

/// Lifecycle of a texture's GPU storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureState {
    /// No GPU handle yet.
    #[default]
    Unallocated,
    /// Storage allocated at the current size, content undefined.
    AllocatedEmpty,
    /// Pixel content uploaded.
    AllocatedContent,
    /// Content could not be decoded; the texture is unusable.
    Failed,
    /// GPU handle released. Terminal.
    Deleted,
}

impl TextureState {
    pub fn is_allocated(&self) -> bool {
        matches!(self, Self::AllocatedEmpty | Self::AllocatedContent)
    }
}

/// The render-pass side of texture binding.
///
/// Hands out the next free texture unit for each texture kind. 2D and cube
/// textures use separate unit sequences.
pub trait DrawingVisitor {
    fn current_texture_unit(&self, kind: TextureKind) -> u32;
    fn increment_texture_unit(&mut self, kind: TextureKind);
}

/// Minimal [`DrawingVisitor`] that only counts texture units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureUnitCounter {
    next_2d: u32,
    next_cube: u32,
}

impl TextureUnitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new draw call.
    pub fn reset(&mut self) {
        self.next_2d = 0;
        self.next_cube = 0;
    }
}

impl DrawingVisitor for TextureUnitCounter {
    fn current_texture_unit(&self, kind: TextureKind) -> u32 {
        match kind {
            TextureKind::Texture2D => self.next_2d,
            TextureKind::Cube => self.next_cube,
        }
    }

    fn increment_texture_unit(&mut self, kind: TextureKind) {
        match kind {
            TextureKind::Texture2D => self.next_2d += 1,
            TextureKind::Cube => self.next_cube += 1,
        }
    }
}

/// A GPU texture.
///
/// Implemented by [`Texture2D`](crate::resources::Texture2D),
/// [`TextureCube`](crate::resources::TextureCube) and the
/// [`TextureUnitTexture`](crate::resources::TextureUnitTexture) decorator.
/// Textures are shared as `Arc<dyn Texture>`, so every method takes `&self`.
///
/// Sampling parameters are stored as requested and reported as effective:
/// repeating wraps read back as [`WrapMode::ClampToEdge`] while either
/// dimension is not a power of two.
pub trait Texture: Send + Sync + Debug {
    fn class(&self) -> TextureClass;

    /// Cache key of this texture, if it has one.
    fn name(&self) -> Option<String>;
    fn set_name(&self, name: Option<String>);

    fn handle(&self) -> Option<TextureHandle>;
    fn state(&self) -> TextureState;
    fn kind(&self) -> TextureKind;

    /// Physical size of the GPU storage.
    fn size(&self) -> IntSize;

    /// Fraction of the physical storage covered by real image content.
    fn coverage(&self) -> Vec2;

    fn pixel_format(&self) -> PixelFormat;
    fn pixel_type(&self) -> PixelType;

    fn has_alpha(&self) -> bool;
    fn set_has_alpha(&self, has_alpha: bool);
    fn has_premultiplied_alpha(&self) -> bool;
    fn set_has_premultiplied_alpha(&self, premultiplied: bool);

    /// Whether the uploaded content is stored top row first.
    fn is_upside_down(&self) -> bool;
    fn set_is_upside_down(&self, is_upside_down: bool);

    fn should_flip_vertically_on_load(&self) -> bool;
    fn set_should_flip_vertically_on_load(&self, flip: bool);
    fn should_flip_horizontally_on_load(&self) -> bool;
    fn set_should_flip_horizontally_on_load(&self, flip: bool);

    fn has_mipmap(&self) -> bool;

    /// Build a mipmap chain if there is none yet.
    ///
    /// Ignored for textures that are not power-of-two in both dimensions.
    fn generate_mipmap(&self);

    /// Parameters in effect, with repeating wraps clamped on NPOT sizes.
    fn parameters(&self) -> TextureParameters;

    /// Parameters as last requested, before any clamping.
    fn requested_parameters(&self) -> TextureParameters;

    fn set_parameters(&self, parameters: TextureParameters);

    /// Upload decoded content into one image of the texture.
    fn bind_content(&self, image: DecodedImage, target: ImageTarget) -> TextureResult<()>;

    /// Replace a rectangle of texels.
    ///
    /// `pixels` holds exactly `rect.width * rect.height` RGBA texels, bottom
    /// row first. They are converted in place to the texture's pixel layout
    /// before upload. An existing mipmap is not regenerated.
    fn replace_pixels(
        &self,
        rect: Viewport,
        target: ImageTarget,
        pixels: &mut [Color4B],
    ) -> TextureResult<()>;

    /// Reallocate every image at a new size, discarding content.
    fn resize_to(&self, size: IntSize) -> TextureResult<()>;

    /// Release the GPU texture. Repeated calls do nothing.
    fn delete_gpu_texture(&self);

    /// Bind for drawing with an explicit texture-unit environment.
    ///
    /// Returns the bound handle, or `None` if the texture has no GPU storage.
    fn bind_with_environment(
        &self,
        visitor: &mut dyn DrawingVisitor,
        environment: Option<&TextureUnit>,
    ) -> Option<TextureHandle>;

    /// Bind for drawing on the visitor's next texture unit.
    fn bind(&self, visitor: &mut dyn DrawingVisitor) -> Option<TextureHandle> {
        let unit = self.texture_unit();
        self.bind_with_environment(visitor, unit.as_ref())
    }

    /// Decoded content kept alive after upload, if retained.
    fn content(&self) -> Option<Arc<TextureContent>>;

    fn texture_unit(&self) -> Option<TextureUnit> {
        None
    }

    fn light_direction(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn is_bump_map(&self) -> bool {
        false
    }

    fn min_filter(&self) -> MinFilter {
        self.parameters().min_filter
    }

    fn set_min_filter(&self, filter: MinFilter) {
        let mut parameters = self.requested_parameters();
        parameters.min_filter = filter;
        self.set_parameters(parameters);
    }

    fn mag_filter(&self) -> MagFilter {
        self.parameters().mag_filter
    }

    fn set_mag_filter(&self, filter: MagFilter) {
        let mut parameters = self.requested_parameters();
        parameters.mag_filter = filter;
        self.set_parameters(parameters);
    }

    fn wrap_s(&self) -> WrapMode {
        self.parameters().wrap_s
    }

    fn set_wrap_s(&self, wrap: WrapMode) {
        let mut parameters = self.requested_parameters();
        parameters.wrap_s = wrap;
        self.set_parameters(parameters);
    }

    fn wrap_t(&self) -> WrapMode {
        self.parameters().wrap_t
    }

    fn set_wrap_t(&self, wrap: WrapMode) {
        let mut parameters = self.requested_parameters();
        parameters.wrap_t = wrap;
        self.set_parameters(parameters);
    }

    /// Row alignment used when uploading texels.
    fn byte_alignment(&self) -> u32 {
        pixel_format::byte_alignment(self.pixel_format(), self.pixel_type())
    }

    fn is_pot_width(&self) -> bool {
        is_pot(self.size().width)
    }

    fn is_pot_height(&self) -> bool {
        is_pot(self.size().height)
    }

    fn is_pot(&self) -> bool {
        self.size().is_pot()
    }

    fn is_texture_2d(&self) -> bool {
        self.kind() == TextureKind::Texture2D
    }

    fn is_texture_cube(&self) -> bool {
        self.kind() == TextureKind::Cube
    }

    fn sampler_semantic(&self) -> SamplerSemantic {
        match self.kind() {
            TextureKind::Texture2D => SamplerSemantic::Texture2D,
            TextureKind::Cube => SamplerSemantic::TextureCube,
        }
    }

    /// Image target a render surface attaches to first.
    fn initial_attachment_face(&self) -> ImageTarget {
        match self.kind() {
            TextureKind::Texture2D => ImageTarget::Texture2D,
            TextureKind::Cube => ImageTarget::Face(CubeFace::PositiveX),
        }
    }
}

/// Returns true if both textures are the same instance.
pub fn same_texture(a: &Arc<dyn Texture>, b: &Arc<dyn Texture>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
