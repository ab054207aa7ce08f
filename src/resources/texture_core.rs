//! State and GPU lifetime shared by the concrete texture variants.
//!
//! [`TextureCore`] drives the texture state machine:
//!
//! ```text
//! Unallocated ──resize_to──▶ AllocatedEmpty ──replace_pixels──▶ AllocatedContent
//!      │                          ▲   ▲                               │
//!      └────────load──────────────┼───┼──────────▶ AllocatedContent   │
//!                                 └───┴────────── resize_to ◀─────────┘
//! any ──delete_gpu_texture──▶ Deleted
//! ```

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use parking_lot::{Mutex, RwLock};

use crate::backend::traits::{SharedBackend, TextureHandle};
use crate::backend::types::*;
use crate::config::TextureConfig;
use crate::error::{TextureError, TextureResult};
use crate::resources::image::DecodedImage;
use crate::resources::pixel_format::{byte_alignment, convert_rgba8888_in_place};
use crate::resources::texture::{DrawingVisitor, TextureState};
use crate::resources::texture_unit::TextureUnit;

/// Decoded content kept alive after upload.
///
/// While it owns the GPU handle of its texture, the handle is destroyed when
/// the last reference to the content goes away instead of when the texture
/// itself is deleted.
pub struct TextureContent {
    image: DecodedImage,
    backend: SharedBackend,
    handle: Mutex<Option<TextureHandle>>,
}

impl TextureContent {
    fn new(image: DecodedImage, backend: SharedBackend, handle: TextureHandle) -> Self {
        Self {
            image,
            backend,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// The image as it was uploaded, after orientation correction.
    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    /// GPU handle owned by this content, if any.
    pub fn handle(&self) -> Option<TextureHandle> {
        *self.handle.lock()
    }

    fn owns(&self, handle: TextureHandle) -> bool {
        *self.handle.lock() == Some(handle)
    }

    /// Give up ownership of the handle without destroying it.
    fn release_handle(&self) -> Option<TextureHandle> {
        self.handle.lock().take()
    }
}

impl fmt::Debug for TextureContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureContent")
            .field("size", &self.image.size())
            .field("pixel_format", &self.image.pixel_format())
            .field("handle", &self.handle())
            .finish()
    }
}

impl Drop for TextureContent {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            log::debug!("Releasing texture {} with its retained content", handle.id());
            self.backend.lock().destroy_texture(handle);
        }
    }
}

struct CoreState {
    name: Option<String>,
    handle: Option<TextureHandle>,
    lifecycle: TextureState,
    size: IntSize,
    coverage: Vec2,
    pixel_format: PixelFormat,
    pixel_type: PixelType,
    /// Parameters as requested; see [`CoreState::effective_parameters`].
    parameters: TextureParameters,
    bound_parameters: Option<TextureParameters>,
    parameters_dirty: bool,
    has_alpha: bool,
    has_premultiplied_alpha: bool,
    is_upside_down: bool,
    flip_vertically_on_load: bool,
    flip_horizontally_on_load: bool,
    has_mipmap: bool,
    generate_mipmaps: bool,
    retain_content: bool,
    pad_to_power_of_two: bool,
    content: Option<Arc<TextureContent>>,
}

impl CoreState {
    /// Requested parameters with repeating wraps clamped on NPOT sizes.
    fn effective_parameters(&self) -> TextureParameters {
        let mut parameters = self.parameters;
        if !self.size.is_pot() {
            if parameters.wrap_s.requires_pot() {
                parameters.wrap_s = WrapMode::ClampToEdge;
            }
            if parameters.wrap_t.requires_pot() {
                parameters.wrap_t = WrapMode::ClampToEdge;
            }
        }
        parameters
    }

    /// Parameters as sent to the GPU.
    fn sampling_parameters(&self) -> TextureParameters {
        let mut parameters = self.effective_parameters();
        if !self.has_mipmap {
            parameters.min_filter = parameters.min_filter.without_mipmap();
        }
        parameters
    }

    fn content_owns(&self, handle: TextureHandle) -> bool {
        self.content.as_ref().is_some_and(|c| c.owns(handle))
    }
}

/// Shared implementation of [`Texture2D`](crate::resources::Texture2D) and
/// [`TextureCube`](crate::resources::TextureCube).
pub(crate) struct TextureCore {
    kind: TextureKind,
    backend: SharedBackend,
    state: RwLock<CoreState>,
}

impl TextureCore {
    pub(crate) fn new(kind: TextureKind, backend: SharedBackend, config: &TextureConfig) -> Self {
        let defaults = config.defaults_for(kind);
        Self {
            kind,
            backend,
            state: RwLock::new(CoreState {
                name: None,
                handle: None,
                lifecycle: TextureState::Unallocated,
                size: IntSize::ZERO,
                coverage: Vec2::ONE,
                pixel_format: PixelFormat::Rgba,
                pixel_type: PixelType::UnsignedByte,
                parameters: defaults.parameters,
                bound_parameters: None,
                parameters_dirty: true,
                has_alpha: false,
                has_premultiplied_alpha: false,
                is_upside_down: false,
                flip_vertically_on_load: defaults.flip_vertically_on_load,
                flip_horizontally_on_load: defaults.flip_horizontally_on_load,
                has_mipmap: false,
                generate_mipmaps: config.should_generate_mipmaps,
                retain_content: config.should_retain_content,
                pad_to_power_of_two: config.should_pad_to_power_of_two,
                content: None,
            }),
        }
    }

    pub(crate) fn kind(&self) -> TextureKind {
        self.kind
    }

    pub(crate) fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub(crate) fn name(&self) -> Option<String> {
        self.state.read().name.clone()
    }

    pub(crate) fn set_name(&self, name: Option<String>) {
        self.state.write().name = name;
    }

    pub(crate) fn handle(&self) -> Option<TextureHandle> {
        self.state.read().handle
    }

    pub(crate) fn state(&self) -> TextureState {
        self.state.read().lifecycle
    }

    pub(crate) fn size(&self) -> IntSize {
        self.state.read().size
    }

    pub(crate) fn coverage(&self) -> Vec2 {
        self.state.read().coverage
    }

    pub(crate) fn pixel_format(&self) -> PixelFormat {
        self.state.read().pixel_format
    }

    pub(crate) fn pixel_type(&self) -> PixelType {
        self.state.read().pixel_type
    }

    /// Set the layout used by later allocations.
    pub(crate) fn set_pixel_layout(&self, format: PixelFormat, ty: PixelType) {
        let mut state = self.state.write();
        state.pixel_format = format;
        state.pixel_type = ty;
        state.has_alpha = format.has_alpha();
    }

    pub(crate) fn has_alpha(&self) -> bool {
        self.state.read().has_alpha
    }

    pub(crate) fn set_has_alpha(&self, has_alpha: bool) {
        self.state.write().has_alpha = has_alpha;
    }

    pub(crate) fn has_premultiplied_alpha(&self) -> bool {
        self.state.read().has_premultiplied_alpha
    }

    pub(crate) fn set_has_premultiplied_alpha(&self, premultiplied: bool) {
        self.state.write().has_premultiplied_alpha = premultiplied;
    }

    pub(crate) fn is_upside_down(&self) -> bool {
        self.state.read().is_upside_down
    }

    pub(crate) fn set_is_upside_down(&self, is_upside_down: bool) {
        self.state.write().is_upside_down = is_upside_down;
    }

    pub(crate) fn should_flip_vertically_on_load(&self) -> bool {
        self.state.read().flip_vertically_on_load
    }

    pub(crate) fn set_should_flip_vertically_on_load(&self, flip: bool) {
        self.state.write().flip_vertically_on_load = flip;
    }

    pub(crate) fn should_flip_horizontally_on_load(&self) -> bool {
        self.state.read().flip_horizontally_on_load
    }

    pub(crate) fn set_should_flip_horizontally_on_load(&self, flip: bool) {
        self.state.write().flip_horizontally_on_load = flip;
    }

    pub(crate) fn has_mipmap(&self) -> bool {
        self.state.read().has_mipmap
    }

    pub(crate) fn parameters(&self) -> TextureParameters {
        self.state.read().effective_parameters()
    }

    pub(crate) fn requested_parameters(&self) -> TextureParameters {
        self.state.read().parameters
    }

    pub(crate) fn set_parameters(&self, parameters: TextureParameters) {
        let mut state = self.state.write();
        state.parameters = parameters;
        state.parameters_dirty = true;
        let effective = state.effective_parameters();
        if effective != parameters {
            log::debug!(
                "Texture {:?} is {}x{}, clamping wrap to {:?}/{:?}",
                state.name,
                state.size.width,
                state.size.height,
                effective.wrap_s,
                effective.wrap_t
            );
        }
    }

    pub(crate) fn content(&self) -> Option<Arc<TextureContent>> {
        self.state.read().content.clone()
    }

    pub(crate) fn mark_failed(&self) {
        let mut state = self.state.write();
        if state.lifecycle != TextureState::Deleted {
            state.lifecycle = TextureState::Failed;
        }
    }

    fn ensure_handle(&self, state: &mut CoreState) -> TextureResult<TextureHandle> {
        if let Some(handle) = state.handle {
            return Ok(handle);
        }
        if state.lifecycle == TextureState::Deleted {
            return Err(TextureError::NotAllocated);
        }
        let handle = self.backend.lock().create_texture(self.kind)?;
        state.handle = Some(handle);
        Ok(handle)
    }

    pub(crate) fn generate_mipmap(&self) {
        let mut state = self.state.write();
        self.generate_mipmap_locked(&mut state);
    }

    fn generate_mipmap_locked(&self, state: &mut CoreState) {
        if state.has_mipmap {
            return;
        }
        let Some(handle) = state.handle else {
            return;
        };
        if !state.size.is_pot() {
            log::debug!(
                "Skipping mipmap for {}x{} texture {:?}",
                state.size.width,
                state.size.height,
                state.name
            );
            return;
        }
        self.backend.lock().generate_mipmap(handle, self.kind);
        state.has_mipmap = true;
        state.parameters_dirty = true;
    }

    /// Orient, upload and describe one decoded image.
    ///
    /// Returns the image as uploaded so callers can retain it.
    pub(crate) fn upload_image(
        &self,
        mut image: DecodedImage,
        target: ImageTarget,
    ) -> TextureResult<DecodedImage> {
        if !target.is_valid_for(self.kind) {
            return Err(TextureError::InvalidTarget {
                target,
                kind: self.kind,
            });
        }

        let mut state = self.state.write();
        // Flip whenever the content does not already have the wanted orientation.
        let flip_v = state.flip_vertically_on_load == image.is_upside_down();
        match (flip_v, state.flip_horizontally_on_load) {
            (true, true) => image.rotate_half_circle(),
            (true, false) => image.flip_vertically(),
            (false, true) => image.flip_horizontally(),
            (false, false) => {}
        }
        if state.pad_to_power_of_two {
            image.pad_to_power_of_two();
        }

        let content_format = image.pixel_format();
        let (format, ty) = (content_format.gl_format(), content_format.gl_type());
        let handle = self.ensure_handle(&mut state)?;
        let size = image.size();
        {
            let mut backend = self.backend.lock();
            backend.allocate_image(handle, target, size, format, ty);
            if image.has_image_data() {
                backend.write_image(
                    handle,
                    target,
                    Viewport::from_size(size),
                    image.pixels(),
                    format,
                    ty,
                    byte_alignment(format, ty),
                );
            }
        }

        state.size = size;
        state.coverage = image.coverage();
        state.pixel_format = format;
        state.pixel_type = ty;
        state.has_alpha = image.has_alpha();
        state.has_premultiplied_alpha = image.has_premultiplied_alpha();
        state.is_upside_down = image.is_upside_down();
        state.has_mipmap = image.has_mipmap() && size.is_pot();
        state.parameters_dirty = true;
        log::debug!(
            "Uploaded {}x{} {:?} into {:?} of texture {}",
            size.width,
            size.height,
            content_format,
            target,
            handle.id()
        );
        Ok(image)
    }

    /// Complete a load: mipmap policy, content retention and state.
    pub(crate) fn finish_load(&self, auto_mipmap: bool, retained: Option<DecodedImage>) {
        let mut state = self.state.write();
        if auto_mipmap && state.generate_mipmaps {
            self.generate_mipmap_locked(&mut state);
        }
        if let (Some(image), true, Some(handle)) = (retained, state.retain_content, state.handle) {
            if let Some(old) = state.content.take() {
                old.release_handle();
            }
            state.content = Some(Arc::new(TextureContent::new(
                image,
                Arc::clone(&self.backend),
                handle,
            )));
        }
        state.lifecycle = TextureState::AllocatedContent;
    }

    pub(crate) fn resize_to(&self, size: IntSize) -> TextureResult<()> {
        let mut state = self.state.write();
        let handle = self.ensure_handle(&mut state)?;
        {
            let mut backend = self.backend.lock();
            for target in self.kind.image_targets() {
                backend.allocate_image(handle, target, size, state.pixel_format, state.pixel_type);
            }
        }
        state.size = size;
        state.coverage = Vec2::ONE;
        state.has_mipmap = false;
        state.parameters_dirty = true;
        state.lifecycle = TextureState::AllocatedEmpty;
        log::debug!(
            "Resized texture {} to {}x{}",
            handle.id(),
            size.width,
            size.height
        );
        Ok(())
    }

    pub(crate) fn replace_pixels(
        &self,
        rect: Viewport,
        target: ImageTarget,
        pixels: &mut [Color4B],
    ) -> TextureResult<()> {
        let mut state = self.state.write();
        let handle = match (state.lifecycle.is_allocated(), state.handle) {
            (true, Some(handle)) => handle,
            _ => return Err(TextureError::NotAllocated),
        };
        if !target.is_valid_for(self.kind) {
            return Err(TextureError::InvalidTarget {
                target,
                kind: self.kind,
            });
        }
        if !rect.fits_within(state.size) {
            return Err(TextureError::RegionOutOfBounds {
                rect,
                size: state.size,
            });
        }
        if pixels.len() != rect.pixel_count() {
            return Err(TextureError::PixelCountMismatch {
                expected: rect.pixel_count(),
                actual: pixels.len(),
            });
        }

        let (format, ty) = (state.pixel_format, state.pixel_type);
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(pixels);
        let len = convert_rgba8888_in_place(bytes, format, ty)?;
        self.backend.lock().write_image(
            handle,
            target,
            rect,
            &bytes[..len],
            format,
            ty,
            byte_alignment(format, ty),
        );
        state.lifecycle = TextureState::AllocatedContent;
        Ok(())
    }

    pub(crate) fn delete_gpu_texture(&self) {
        let mut state = self.state.write();
        let Some(handle) = state.handle.take() else {
            log::trace!("Texture {:?} has no GPU storage to delete", state.name);
            return;
        };
        if state.content_owns(handle) {
            // The content wrapper destroys the handle once it is released.
            state.content = None;
        } else {
            self.backend.lock().destroy_texture(handle);
        }
        state.has_mipmap = false;
        state.bound_parameters = None;
        state.lifecycle = TextureState::Deleted;
        log::debug!("Deleted texture {} ({:?})", handle.id(), state.name);
    }

    pub(crate) fn bind(
        &self,
        visitor: &mut dyn DrawingVisitor,
        environment: Option<&TextureUnit>,
    ) -> Option<TextureHandle> {
        let mut state = self.state.write();
        let handle = state.handle?;
        let unit = visitor.current_texture_unit(self.kind);
        {
            let mut backend = self.backend.lock();
            backend.bind_texture(unit, self.kind, handle);
            if state.parameters_dirty {
                let wanted = state.sampling_parameters();
                for parameter in changed_parameters(state.bound_parameters, wanted) {
                    backend.set_texture_parameter(handle, self.kind, parameter);
                }
                state.bound_parameters = Some(wanted);
                state.parameters_dirty = false;
            }
            backend.bind_texture_environment(unit, environment);
        }
        visitor.increment_texture_unit(self.kind);
        Some(handle)
    }
}

/// Parameter writes needed to move the GPU from `bound` to `wanted`.
fn changed_parameters(
    bound: Option<TextureParameters>,
    wanted: TextureParameters,
) -> Vec<TextureParameter> {
    let mut writes = Vec::new();
    if bound.map(|b| b.min_filter) != Some(wanted.min_filter) {
        writes.push(TextureParameter::MinFilter(wanted.min_filter));
    }
    if bound.map(|b| b.mag_filter) != Some(wanted.mag_filter) {
        writes.push(TextureParameter::MagFilter(wanted.mag_filter));
    }
    if bound.map(|b| b.wrap_s) != Some(wanted.wrap_s) {
        writes.push(TextureParameter::WrapS(wanted.wrap_s));
    }
    if bound.map(|b| b.wrap_t) != Some(wanted.wrap_t) {
        writes.push(TextureParameter::WrapT(wanted.wrap_t));
    }
    writes
}

impl fmt::Debug for TextureCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("TextureCore")
            .field("kind", &self.kind)
            .field("name", &state.name)
            .field("handle", &state.handle)
            .field("state", &state.lifecycle)
            .field("size", &state.size)
            .field("pixel_format", &state.pixel_format)
            .field("pixel_type", &state.pixel_type)
            .finish()
    }
}

impl Drop for TextureCore {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(handle) = state.handle.take() {
            if !state.content_owns(handle) {
                self.backend.lock().destroy_texture(handle);
            }
        }
    }
}

/// Implements [`Texture`](crate::resources::Texture) for a type with a
/// `core: TextureCore` field. Variant-specific items are passed in the block.
macro_rules! impl_texture_via_core {
    ($ty:ty, $class:expr, { $($extra:tt)* }) => {
        impl $crate::resources::texture::Texture for $ty {
            fn class(&self) -> $crate::resources::texture::TextureClass {
                $class
            }

            fn name(&self) -> Option<String> {
                self.core.name()
            }

            fn set_name(&self, name: Option<String>) {
                self.core.set_name(name)
            }

            fn handle(&self) -> Option<$crate::backend::TextureHandle> {
                self.core.handle()
            }

            fn state(&self) -> $crate::resources::texture::TextureState {
                self.core.state()
            }

            fn kind(&self) -> $crate::backend::TextureKind {
                self.core.kind()
            }

            fn size(&self) -> $crate::backend::IntSize {
                self.core.size()
            }

            fn coverage(&self) -> glam::Vec2 {
                self.core.coverage()
            }

            fn pixel_format(&self) -> $crate::backend::PixelFormat {
                self.core.pixel_format()
            }

            fn pixel_type(&self) -> $crate::backend::PixelType {
                self.core.pixel_type()
            }

            fn has_alpha(&self) -> bool {
                self.core.has_alpha()
            }

            fn set_has_alpha(&self, has_alpha: bool) {
                self.core.set_has_alpha(has_alpha)
            }

            fn has_premultiplied_alpha(&self) -> bool {
                self.core.has_premultiplied_alpha()
            }

            fn set_has_premultiplied_alpha(&self, premultiplied: bool) {
                self.core.set_has_premultiplied_alpha(premultiplied)
            }

            fn is_upside_down(&self) -> bool {
                self.core.is_upside_down()
            }

            fn set_is_upside_down(&self, is_upside_down: bool) {
                self.core.set_is_upside_down(is_upside_down)
            }

            fn should_flip_vertically_on_load(&self) -> bool {
                self.core.should_flip_vertically_on_load()
            }

            fn set_should_flip_vertically_on_load(&self, flip: bool) {
                self.core.set_should_flip_vertically_on_load(flip)
            }

            fn should_flip_horizontally_on_load(&self) -> bool {
                self.core.should_flip_horizontally_on_load()
            }

            fn set_should_flip_horizontally_on_load(&self, flip: bool) {
                self.core.set_should_flip_horizontally_on_load(flip)
            }

            fn has_mipmap(&self) -> bool {
                self.core.has_mipmap()
            }

            fn generate_mipmap(&self) {
                self.core.generate_mipmap()
            }

            fn parameters(&self) -> $crate::backend::TextureParameters {
                self.core.parameters()
            }

            fn requested_parameters(&self) -> $crate::backend::TextureParameters {
                self.core.requested_parameters()
            }

            fn set_parameters(&self, parameters: $crate::backend::TextureParameters) {
                self.core.set_parameters(parameters)
            }

            fn replace_pixels(
                &self,
                rect: $crate::backend::Viewport,
                target: $crate::backend::ImageTarget,
                pixels: &mut [$crate::backend::Color4B],
            ) -> $crate::error::TextureResult<()> {
                self.core.replace_pixels(rect, target, pixels)
            }

            fn resize_to(&self, size: $crate::backend::IntSize) -> $crate::error::TextureResult<()> {
                self.core.resize_to(size)
            }

            fn delete_gpu_texture(&self) {
                self.core.delete_gpu_texture()
            }

            fn bind_with_environment(
                &self,
                visitor: &mut dyn $crate::resources::texture::DrawingVisitor,
                environment: Option<&$crate::resources::texture_unit::TextureUnit>,
            ) -> Option<$crate::backend::TextureHandle> {
                self.core.bind(visitor, environment)
            }

            fn content(&self) -> Option<std::sync::Arc<$crate::resources::texture_core::TextureContent>> {
                self.core.content()
            }

            $($extra)*
        }
    };
}

pub(crate) use impl_texture_via_core;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{share_backend, DummyBackend};
    use crate::resources::pixel_format::ContentPixelFormat;
    use crate::resources::texture::TextureUnitCounter;

    fn core_with(config: &TextureConfig) -> (Arc<Mutex<DummyBackend>>, TextureCore) {
        let backend = share_backend(DummyBackend::new());
        let core = TextureCore::new(TextureKind::Texture2D, backend.clone(), config);
        (backend, core)
    }

    #[test]
    fn test_changed_parameters() {
        let all = changed_parameters(None, TextureParameters::default());
        assert_eq!(all.len(), 4);

        let bound = TextureParameters::default();
        let wanted = bound.with_wrap(WrapMode::ClampToEdge);
        assert_eq!(
            changed_parameters(Some(bound), wanted),
            vec![
                TextureParameter::WrapS(WrapMode::ClampToEdge),
                TextureParameter::WrapT(WrapMode::ClampToEdge)
            ]
        );
    }

    #[test]
    fn test_bind_sends_only_changed_parameters() {
        let (backend, core) = core_with(&TextureConfig::default());
        core.resize_to(IntSize::square(4)).unwrap();
        let handle = core.handle().unwrap();

        let mut visitor = TextureUnitCounter::new();
        core.bind(&mut visitor, None);
        assert_eq!(backend.lock().parameter_writes(handle).len(), 4);
        // No mipmap yet, so the mipmap part of the filter is dropped.
        assert_eq!(
            backend.lock().parameter_writes(handle)[0],
            TextureParameter::MinFilter(MinFilter::Linear)
        );

        core.bind(&mut visitor, None);
        assert_eq!(backend.lock().parameter_writes(handle).len(), 4);

        core.generate_mipmap();
        core.bind(&mut visitor, None);
        let writes = backend.lock().parameter_writes(handle).to_vec();
        assert_eq!(writes.len(), 5);
        assert_eq!(
            writes[4],
            TextureParameter::MinFilter(MinFilter::LinearMipmapNearest)
        );
        assert_eq!(backend.lock().bound_texture(2), Some((TextureKind::Texture2D, handle)));
    }

    #[test]
    fn test_unallocated_texture_does_not_bind() {
        let (_backend, core) = core_with(&TextureConfig::default());
        let mut visitor = TextureUnitCounter::new();
        assert_eq!(core.bind(&mut visitor, None), None);
        assert_eq!(visitor.current_texture_unit(TextureKind::Texture2D), 0);
    }

    #[test]
    fn test_retained_content_owns_handle() {
        let config = TextureConfig::default().with_retain_content(true);
        let (backend, core) = core_with(&config);
        let image = DecodedImage::solid(IntSize::square(2), Color4B::RED);
        let uploaded = core.upload_image(image, ImageTarget::Texture2D).unwrap();
        core.finish_load(true, Some(uploaded));

        let handle = core.handle().unwrap();
        let content = core.content().unwrap();
        assert_eq!(content.handle(), Some(handle));

        core.delete_gpu_texture();
        assert_eq!(core.state(), TextureState::Deleted);
        // Still held by `content`.
        assert!(backend.lock().is_live(handle));
        drop(content);
        assert!(!backend.lock().is_live(handle));
    }

    #[test]
    fn test_drop_releases_handle() {
        let (backend, core) = core_with(&TextureConfig::default());
        core.resize_to(IntSize::new(3, 5)).unwrap();
        let handle = core.handle().unwrap();
        drop(core);
        assert_eq!(backend.lock().destroyed_textures(), &[handle]);
    }

    #[test]
    fn test_delete_twice_is_noop() {
        let (backend, core) = core_with(&TextureConfig::default());
        core.resize_to(IntSize::square(8)).unwrap();
        core.delete_gpu_texture();
        core.delete_gpu_texture();
        assert_eq!(backend.lock().destroyed_textures().len(), 1);
        assert_eq!(core.resize_to(IntSize::square(8)), Err(TextureError::NotAllocated));
    }

    #[test]
    fn test_upload_rejects_cube_face_target() {
        let (_backend, core) = core_with(&TextureConfig::default());
        let image = DecodedImage::empty(IntSize::square(2), ContentPixelFormat::A8);
        let result = core.upload_image(image, ImageTarget::Face(CubeFace::NegativeY));
        assert!(matches!(result, Err(TextureError::InvalidTarget { .. })));
        assert_eq!(core.state(), TextureState::Unallocated);
    }
}
