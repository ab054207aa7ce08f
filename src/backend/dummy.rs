//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't talk to a GPU. It records every call and keeps the
//! uploaded texel bytes in memory, so the texture layer can be exercised and
//! inspected without graphics hardware.

use std::collections::HashMap;

use crate::backend::traits::{BackendError, BackendResult, GraphicsBackend, TextureHandle};
use crate::backend::types::*;
use crate::resources::pixel_format::bytes_per_pixel;
use crate::resources::TextureUnit;

/// CPU copy of one allocated texture image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyImage {
    pub size: IntSize,
    pub format: PixelFormat,
    pub ty: PixelType,
    pub data: Vec<u8>,
}

/// Everything the dummy backend knows about a live texture.
#[derive(Debug, Clone)]
pub struct DummyTexture {
    pub kind: TextureKind,
    pub images: HashMap<ImageTarget, DummyImage>,
    pub mipmap_generations: u32,
    pub parameter_writes: Vec<TextureParameter>,
}

/// Dummy GPU backend.
#[derive(Debug)]
pub struct DummyBackend {
    next_handle: u64,
    textures: HashMap<TextureHandle, DummyTexture>,
    destroyed: Vec<TextureHandle>,
    bound: HashMap<u32, (TextureKind, TextureHandle)>,
    environments: HashMap<u32, Option<TextureUnit>>,
    fail_texture_creation: bool,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            textures: HashMap::new(),
            destroyed: Vec::new(),
            bound: HashMap::new(),
            environments: HashMap::new(),
            fail_texture_creation: false,
        }
    }

    /// Make subsequent `create_texture` calls fail (for testing error paths).
    pub fn set_fail_texture_creation(&mut self, fail: bool) {
        self.fail_texture_creation = fail;
    }

    /// Number of textures currently alive.
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn is_live(&self, texture: TextureHandle) -> bool {
        self.textures.contains_key(&texture)
    }

    /// Handles destroyed so far, in destruction order.
    pub fn destroyed_textures(&self) -> &[TextureHandle] {
        &self.destroyed
    }

    pub fn texture(&self, texture: TextureHandle) -> Option<&DummyTexture> {
        self.textures.get(&texture)
    }

    pub fn image(&self, texture: TextureHandle, target: ImageTarget) -> Option<&DummyImage> {
        self.textures.get(&texture)?.images.get(&target)
    }

    /// How many times a mipmap was generated for the texture.
    pub fn mipmap_generations(&self, texture: TextureHandle) -> u32 {
        self.textures
            .get(&texture)
            .map_or(0, |t| t.mipmap_generations)
    }

    /// Parameter writes received for the texture, in order.
    pub fn parameter_writes(&self, texture: TextureHandle) -> &[TextureParameter] {
        self.textures
            .get(&texture)
            .map_or(&[], |t| t.parameter_writes.as_slice())
    }

    /// Texture bound to a texture unit.
    pub fn bound_texture(&self, unit: u32) -> Option<(TextureKind, TextureHandle)> {
        self.bound.get(&unit).copied()
    }

    /// Environment bound to a texture unit; `Some(None)` is the default environment.
    pub fn bound_environment(&self, unit: u32) -> Option<Option<&TextureUnit>> {
        self.environments.get(&unit).map(|env| env.as_ref())
    }

    /// Read back a rectangle of an image, tightly packed, bottom row first.
    pub fn read_pixels(
        &self,
        texture: TextureHandle,
        target: ImageTarget,
        rect: Viewport,
    ) -> Option<Vec<u8>> {
        let image = self.image(texture, target)?;
        if !rect.fits_within(image.size) {
            return None;
        }
        let bpp = bytes_per_pixel(image.format, image.ty) as usize;
        let row_len = rect.width as usize * bpp;
        let mut out = Vec::with_capacity(row_len * rect.height as usize);
        for row in 0..rect.height as usize {
            let start = ((rect.y as usize + row) * image.size.width as usize + rect.x as usize) * bpp;
            out.extend_from_slice(&image.data[start..start + row_len]);
        }
        Some(out)
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn create_texture(&mut self, kind: TextureKind) -> BackendResult<TextureHandle> {
        if self.fail_texture_creation {
            return Err(BackendError::TextureCreationFailed(
                "texture creation disabled".to_string(),
            ));
        }
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        log::trace!("DummyBackend: creating {:?} texture {}", kind, handle.0);
        self.textures.insert(
            handle,
            DummyTexture {
                kind,
                images: HashMap::new(),
                mipmap_generations: 0,
                parameter_writes: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn allocate_image(
        &mut self,
        texture: TextureHandle,
        target: ImageTarget,
        size: IntSize,
        format: PixelFormat,
        ty: PixelType,
    ) {
        log::trace!(
            "DummyBackend: allocating {:?} of texture {} ({}x{}, {:?}/{:?})",
            target,
            texture.0,
            size.width,
            size.height,
            format,
            ty
        );
        let Some(tex) = self.textures.get_mut(&texture) else {
            log::warn!("DummyBackend: allocate on unknown texture {}", texture.0);
            return;
        };
        let len = size.area() * bytes_per_pixel(format, ty) as usize;
        tex.images.insert(
            target,
            DummyImage {
                size,
                format,
                ty,
                data: vec![0; len],
            },
        );
    }

    fn write_image(
        &mut self,
        texture: TextureHandle,
        target: ImageTarget,
        rect: Viewport,
        pixels: &[u8],
        format: PixelFormat,
        ty: PixelType,
        alignment: u32,
    ) {
        log::trace!(
            "DummyBackend: write_image {:?} of texture {} rect={:?} len={}",
            target,
            texture.0,
            rect,
            pixels.len()
        );
        let Some(image) = self
            .textures
            .get_mut(&texture)
            .and_then(|t| t.images.get_mut(&target))
        else {
            log::warn!(
                "DummyBackend: write to unallocated {:?} of texture {}",
                target,
                texture.0
            );
            return;
        };
        if image.format != format || image.ty != ty || !rect.fits_within(image.size) {
            log::warn!(
                "DummyBackend: rejected write {:?} ({:?}/{:?}) into {}x{} ({:?}/{:?})",
                rect,
                format,
                ty,
                image.size.width,
                image.size.height,
                image.format,
                image.ty
            );
            return;
        }

        let bpp = bytes_per_pixel(format, ty) as usize;
        let row_len = rect.width as usize * bpp;
        let align = alignment.max(1) as usize;
        let src_stride = row_len.div_ceil(align) * align;
        for row in 0..rect.height as usize {
            let src = row * src_stride;
            if src + row_len > pixels.len() {
                log::warn!("DummyBackend: pixel data ends early at row {}", row);
                break;
            }
            let dst = ((rect.y as usize + row) * image.size.width as usize + rect.x as usize) * bpp;
            image.data[dst..dst + row_len].copy_from_slice(&pixels[src..src + row_len]);
        }
    }

    fn generate_mipmap(&mut self, texture: TextureHandle, kind: TextureKind) {
        log::trace!("DummyBackend: generating mipmap of {:?} texture {}", kind, texture.0);
        if let Some(tex) = self.textures.get_mut(&texture) {
            tex.mipmap_generations += 1;
        }
    }

    fn set_texture_parameter(
        &mut self,
        texture: TextureHandle,
        _kind: TextureKind,
        parameter: TextureParameter,
    ) {
        log::trace!("DummyBackend: texture {} {:?}", texture.0, parameter);
        if let Some(tex) = self.textures.get_mut(&texture) {
            tex.parameter_writes.push(parameter);
        }
    }

    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: TextureHandle) {
        log::trace!("DummyBackend: binding texture {} to unit {}", texture.0, unit);
        self.bound.insert(unit, (kind, texture));
    }

    fn bind_texture_environment(&mut self, unit: u32, environment: Option<&TextureUnit>) {
        self.environments.insert(unit, environment.cloned());
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        log::trace!("DummyBackend: destroying texture {}", texture.0);
        if self.textures.remove(&texture).is_some() {
            self.destroyed.push(texture);
        } else {
            log::warn!("DummyBackend: destroying unknown texture {}", texture.0);
        }
    }
}
