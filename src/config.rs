//! Texture creation defaults.
//!
//! Every per-variant default (orientation policy, sampling parameters) and
//! every load-time policy lives in one [`TextureConfig`]. A texture copies the
//! values it needs when it is created, so later changes only affect textures
//! created afterwards.

use std::path::{Path, PathBuf};

use crate::backend::types::{MagFilter, MinFilter, TextureKind, TextureParameters, WrapMode};

/// Defaults applied to newly created textures of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDefaults {
    pub flip_vertically_on_load: bool,
    pub flip_horizontally_on_load: bool,
    pub parameters: TextureParameters,
}

impl TextureDefaults {
    /// 2D images usually decode top row first, so they are flipped vertically.
    pub const fn texture_2d() -> Self {
        Self {
            flip_vertically_on_load: true,
            flip_horizontally_on_load: false,
            parameters: TextureParameters::new(
                MinFilter::LinearMipmapNearest,
                MagFilter::Linear,
                WrapMode::Repeat,
                WrapMode::Repeat,
            ),
        }
    }

    /// Cube faces are stored rotated by half a circle.
    pub const fn texture_cube() -> Self {
        Self {
            flip_vertically_on_load: false,
            flip_horizontally_on_load: true,
            parameters: TextureParameters::new(
                MinFilter::LinearMipmapNearest,
                MagFilter::Linear,
                WrapMode::ClampToEdge,
                WrapMode::ClampToEdge,
            ),
        }
    }

    pub fn with_flip_vertically_on_load(mut self, flip: bool) -> Self {
        self.flip_vertically_on_load = flip;
        self
    }

    pub fn with_flip_horizontally_on_load(mut self, flip: bool) -> Self {
        self.flip_horizontally_on_load = flip;
        self
    }

    pub fn with_parameters(mut self, parameters: TextureParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Texture subsystem configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureConfig {
    pub texture_2d: TextureDefaults,
    pub texture_cube: TextureDefaults,
    /// Generate a mipmap after loading power-of-two content that has none.
    pub should_generate_mipmaps: bool,
    /// Keep decoded 2D content in memory after upload.
    pub should_retain_content: bool,
    /// Pad decoded images up to power-of-two dimensions before upload.
    pub should_pad_to_power_of_two: bool,
    /// Directory that relative file paths are resolved against.
    pub resource_root: Option<PathBuf>,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            texture_2d: TextureDefaults::texture_2d(),
            texture_cube: TextureDefaults::texture_cube(),
            should_generate_mipmaps: true,
            should_retain_content: false,
            should_pad_to_power_of_two: false,
            resource_root: None,
        }
    }
}

impl TextureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture_2d_defaults(mut self, defaults: TextureDefaults) -> Self {
        self.texture_2d = defaults;
        self
    }

    pub fn with_texture_cube_defaults(mut self, defaults: TextureDefaults) -> Self {
        self.texture_cube = defaults;
        self
    }

    pub fn with_generate_mipmaps(mut self, generate: bool) -> Self {
        self.should_generate_mipmaps = generate;
        self
    }

    pub fn with_retain_content(mut self, retain: bool) -> Self {
        self.should_retain_content = retain;
        self
    }

    pub fn with_pad_to_power_of_two(mut self, pad: bool) -> Self {
        self.should_pad_to_power_of_two = pad;
        self
    }

    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(root.into());
        self
    }

    /// Defaults for textures of the given kind.
    pub fn defaults_for(&self, kind: TextureKind) -> &TextureDefaults {
        match kind {
            TextureKind::Texture2D => &self.texture_2d,
            TextureKind::Cube => &self.texture_cube,
        }
    }

    /// Resolve a file path against the resource root.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.resource_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_defaults() {
        let config = TextureConfig::default();
        let d2 = config.defaults_for(TextureKind::Texture2D);
        assert!(d2.flip_vertically_on_load);
        assert!(!d2.flip_horizontally_on_load);
        assert_eq!(d2.parameters.wrap_s, WrapMode::Repeat);

        let cube = config.defaults_for(TextureKind::Cube);
        assert!(!cube.flip_vertically_on_load);
        assert!(cube.flip_horizontally_on_load);
        assert_eq!(cube.parameters.wrap_t, WrapMode::ClampToEdge);

        assert!(config.should_generate_mipmaps);
        assert!(!config.should_retain_content);
    }

    #[test]
    fn test_resolve_path() {
        let config = TextureConfig::new().with_resource_root("/assets");
        assert_eq!(
            config.resolve_path("stone.png"),
            PathBuf::from("/assets/stone.png")
        );
        assert_eq!(
            config.resolve_path("/abs/stone.png"),
            PathBuf::from("/abs/stone.png")
        );
        assert_eq!(
            TextureConfig::new().resolve_path("stone.png"),
            PathBuf::from("stone.png")
        );
    }
}
