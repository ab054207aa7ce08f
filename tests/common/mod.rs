//! Common utilities for texture integration tests.
//!
//! Fixtures are real PNG files written into a temporary resource root, and
//! uploads land in a [`DummyBackend`] so texels can be read back.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use texture_engine::{
    share_backend, Color4B, CubeFace, DummyBackend, ImageTarget, IntSize, Texture, TextureConfig,
    TextureLibrary, Viewport,
};

/// Install the test logger once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Test Context
// ============================================================================

/// A texture library over a dummy backend, resolving files in a temp dir.
pub struct TestContext {
    pub dir: TempDir,
    pub backend: Arc<Mutex<DummyBackend>>,
    pub library: TextureLibrary,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(TextureConfig::default())
    }

    pub fn with_config(config: TextureConfig) -> Self {
        init_logging();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let backend = share_backend(DummyBackend::new());
        let library = TextureLibrary::new(backend.clone())
            .with_config(config.with_resource_root(dir.path()));
        Self {
            dir,
            backend,
            library,
        }
    }

    /// Write a PNG whose pixel at `(x, y)` (top row first) is `pixel(x, y)`.
    pub fn write_png(
        &self,
        name: &str,
        size: IntSize,
        pixel: impl Fn(u32, u32) -> Color4B,
    ) -> PathBuf {
        let path = self.dir.path().join(name);
        let image = image::RgbaImage::from_fn(size.width, size.height, |x, y| {
            image::Rgba(pixel(x, y).to_array())
        });
        image.save(&path).expect("Failed to write PNG fixture");
        path
    }

    #[allow(dead_code)]
    pub fn write_solid_png(&self, name: &str, size: IntSize, color: Color4B) -> PathBuf {
        self.write_png(name, size, |_, _| color)
    }

    /// Write the six face files of a cube pattern such as `"Tex%@.png"`.
    #[allow(dead_code)]
    pub fn write_cube_faces(&self, pattern: &str, side: u32) {
        for face in CubeFace::ALL {
            let name = pattern.replace("%@", face.file_token());
            self.write_solid_png(&name, IntSize::square(side), Color4B::WHITE);
        }
    }

    /// Read back texels of a texture image, tightly packed, bottom row first.
    #[allow(dead_code)]
    pub fn read_back(&self, texture: &dyn Texture, target: ImageTarget, rect: Viewport) -> Vec<u8> {
        let handle = texture.handle().expect("Texture has no GPU handle");
        self.backend
            .lock()
            .read_pixels(handle, target, rect)
            .expect("Region not readable")
    }
}

/// Texels with distinct, easily recognizable values.
#[allow(dead_code)]
pub fn test_pattern(count: usize) -> Vec<Color4B> {
    (0..count)
        .map(|i| {
            let i = i as u8;
            Color4B::new(i.wrapping_mul(37), i.wrapping_mul(91), 255 - i, 128 + i % 128)
        })
        .collect()
}
