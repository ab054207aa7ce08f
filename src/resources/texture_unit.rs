//! Fixed-pipeline texture units and the texture decorator that carries one.

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use parking_lot::RwLock;

use crate::backend::traits::TextureHandle;
use crate::backend::types::*;
use crate::error::TextureResult;
use crate::resources::image::DecodedImage;
use crate::resources::texture::{DrawingVisitor, Texture, TextureClass, TextureState};
use crate::resources::texture_core::TextureContent;

/// How a texture unit combines its texel with the incoming fragment color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureEnvironmentMode {
    #[default]
    Modulate,
    Replace,
    Add,
    Decal,
    Blend,
    /// Use [`TextureUnit::combine_rgb`].
    Combine,
}

/// RGB combine function used in [`TextureEnvironmentMode::Combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CombineFunction {
    #[default]
    Modulate,
    Replace,
    Add,
    AddSigned,
    Interpolate,
    Subtract,
    Dot3Rgb,
    Dot3Rgba,
}

/// Multi-texture combination settings of one texture unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureUnit {
    pub environment_mode: TextureEnvironmentMode,
    pub combine_rgb: CombineFunction,
    pub constant_color: Vec4,
}

impl Default for TextureUnit {
    fn default() -> Self {
        Self {
            environment_mode: TextureEnvironmentMode::Modulate,
            combine_rgb: CombineFunction::Modulate,
            constant_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl TextureUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// A DOT3 bump-mapping unit lit from `light_direction`.
    pub fn bump_map(light_direction: Vec3) -> Self {
        let mut unit = Self {
            environment_mode: TextureEnvironmentMode::Combine,
            combine_rgb: CombineFunction::Dot3Rgb,
            ..Self::default()
        };
        unit.set_light_direction(light_direction);
        unit
    }

    pub fn with_environment_mode(mut self, mode: TextureEnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_combine_rgb(mut self, function: CombineFunction) -> Self {
        self.combine_rgb = function;
        self
    }

    pub fn with_constant_color(mut self, color: Vec4) -> Self {
        self.constant_color = color;
        self
    }

    pub fn is_bump_map(&self) -> bool {
        self.environment_mode == TextureEnvironmentMode::Combine
            && matches!(
                self.combine_rgb,
                CombineFunction::Dot3Rgb | CombineFunction::Dot3Rgba
            )
    }

    /// Light direction in tangent space, decoded from the constant color.
    pub fn light_direction(&self) -> Vec3 {
        self.constant_color.truncate() * 2.0 - Vec3::ONE
    }

    /// Store a tangent-space light direction in the constant color.
    ///
    /// Components are mapped from `[-1, 1]` to `[0, 1]`; alpha is untouched.
    pub fn set_light_direction(&mut self, direction: Vec3) {
        let encoded = (direction.normalize_or_zero() + Vec3::ONE) * 0.5;
        self.constant_color = encoded.extend(self.constant_color.w);
    }
}

/// A texture paired with its own texture-unit configuration.
///
/// Queries and mutations are forwarded to the wrapped texture; only the
/// texture unit belongs to the decorator.
#[derive(Debug)]
pub struct TextureUnitTexture {
    texture: RwLock<Arc<dyn Texture>>,
    texture_unit: RwLock<Option<TextureUnit>>,
}

impl TextureUnitTexture {
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self {
            texture: RwLock::new(texture),
            texture_unit: RwLock::new(None),
        }
    }

    pub fn with_texture_unit(texture: Arc<dyn Texture>, texture_unit: TextureUnit) -> Self {
        Self {
            texture: RwLock::new(texture),
            texture_unit: RwLock::new(Some(texture_unit)),
        }
    }

    /// The wrapped texture.
    pub fn texture(&self) -> Arc<dyn Texture> {
        Arc::clone(&self.texture.read())
    }

    /// Replace the wrapped texture.
    pub fn set_texture(&self, texture: Arc<dyn Texture>) {
        *self.texture.write() = texture;
    }

    pub fn set_texture_unit(&self, texture_unit: Option<TextureUnit>) {
        *self.texture_unit.write() = texture_unit;
    }

    /// Set the bump-map light direction, adding a default texture unit if
    /// there is none yet.
    pub fn set_light_direction(&self, direction: Vec3) {
        self.texture_unit
            .write()
            .get_or_insert_with(TextureUnit::default)
            .set_light_direction(direction);
    }
}

impl Texture for TextureUnitTexture {
    fn class(&self) -> TextureClass {
        TextureClass::TextureUnit
    }

    fn name(&self) -> Option<String> {
        self.texture.read().name()
    }

    fn set_name(&self, name: Option<String>) {
        self.texture.read().set_name(name)
    }

    fn handle(&self) -> Option<TextureHandle> {
        self.texture.read().handle()
    }

    fn state(&self) -> TextureState {
        self.texture.read().state()
    }

    fn kind(&self) -> TextureKind {
        self.texture.read().kind()
    }

    fn size(&self) -> IntSize {
        self.texture.read().size()
    }

    fn coverage(&self) -> Vec2 {
        self.texture.read().coverage()
    }

    fn pixel_format(&self) -> PixelFormat {
        self.texture.read().pixel_format()
    }

    fn pixel_type(&self) -> PixelType {
        self.texture.read().pixel_type()
    }

    fn has_alpha(&self) -> bool {
        self.texture.read().has_alpha()
    }

    fn set_has_alpha(&self, has_alpha: bool) {
        self.texture.read().set_has_alpha(has_alpha)
    }

    fn has_premultiplied_alpha(&self) -> bool {
        self.texture.read().has_premultiplied_alpha()
    }

    fn set_has_premultiplied_alpha(&self, premultiplied: bool) {
        self.texture.read().set_has_premultiplied_alpha(premultiplied)
    }

    fn is_upside_down(&self) -> bool {
        self.texture.read().is_upside_down()
    }

    fn set_is_upside_down(&self, is_upside_down: bool) {
        self.texture.read().set_is_upside_down(is_upside_down)
    }

    fn should_flip_vertically_on_load(&self) -> bool {
        self.texture.read().should_flip_vertically_on_load()
    }

    fn set_should_flip_vertically_on_load(&self, flip: bool) {
        self.texture.read().set_should_flip_vertically_on_load(flip)
    }

    fn should_flip_horizontally_on_load(&self) -> bool {
        self.texture.read().should_flip_horizontally_on_load()
    }

    fn set_should_flip_horizontally_on_load(&self, flip: bool) {
        self.texture.read().set_should_flip_horizontally_on_load(flip)
    }

    fn has_mipmap(&self) -> bool {
        self.texture.read().has_mipmap()
    }

    fn generate_mipmap(&self) {
        self.texture.read().generate_mipmap()
    }

    fn parameters(&self) -> TextureParameters {
        self.texture.read().parameters()
    }

    fn requested_parameters(&self) -> TextureParameters {
        self.texture.read().requested_parameters()
    }

    fn set_parameters(&self, parameters: TextureParameters) {
        self.texture.read().set_parameters(parameters)
    }

    fn bind_content(&self, image: DecodedImage, target: ImageTarget) -> TextureResult<()> {
        self.texture.read().bind_content(image, target)
    }

    fn replace_pixels(
        &self,
        rect: Viewport,
        target: ImageTarget,
        pixels: &mut [Color4B],
    ) -> TextureResult<()> {
        self.texture.read().replace_pixels(rect, target, pixels)
    }

    fn resize_to(&self, size: IntSize) -> TextureResult<()> {
        self.texture.read().resize_to(size)
    }

    fn delete_gpu_texture(&self) {
        self.texture.read().delete_gpu_texture()
    }

    fn bind_with_environment(
        &self,
        visitor: &mut dyn DrawingVisitor,
        environment: Option<&TextureUnit>,
    ) -> Option<TextureHandle> {
        self.texture.read().bind_with_environment(visitor, environment)
    }

    fn content(&self) -> Option<Arc<TextureContent>> {
        self.texture.read().content()
    }

    fn texture_unit(&self) -> Option<TextureUnit> {
        self.texture_unit.read().clone()
    }

    fn light_direction(&self) -> Vec3 {
        self.texture_unit
            .read()
            .as_ref()
            .map_or(Vec3::ZERO, TextureUnit::light_direction)
    }

    fn is_bump_map(&self) -> bool {
        self.texture_unit
            .read()
            .as_ref()
            .is_some_and(TextureUnit::is_bump_map)
    }
}
