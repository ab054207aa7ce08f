//! Integration tests for texture loading, updates and binding.

mod common;

use std::sync::Arc;

use glam::{Vec2, Vec3};
use rstest::rstest;

use common::{test_pattern, TestContext};
use texture_engine::resources::pixel_format::unpack_to_rgba8888;
use texture_engine::{
    Color4B, CubeFace, FileImageDecoder, ImageTarget, IntSize, PixelFormat, PixelType, Texture,
    TextureConfig, TextureCube, TextureError, TextureKind, TextureState, TextureUnit,
    TextureUnitCounter, Viewport, WrapMode,
};

fn rgba_bytes(colors: &[Color4B]) -> Vec<u8> {
    colors.iter().flat_map(|c| c.to_array()).collect()
}

// ============================================================================
// Orientation
// ============================================================================

#[test]
fn test_2d_load_is_flipped_right_way_up() {
    let ctx = TestContext::new();
    ctx.write_png("rows.png", IntSize::square(2), |_, y| {
        if y == 0 {
            Color4B::RED
        } else {
            Color4B::BLUE
        }
    });

    let texture = ctx.library.texture_from_file("rows.png").unwrap();
    assert!(!texture.is_upside_down());
    let bottom_left = ctx.read_back(texture.as_ref(), ImageTarget::Texture2D, Viewport::new(0, 0, 1, 1));
    assert_eq!(bottom_left, Color4B::BLUE.to_array());
    let top_left = ctx.read_back(texture.as_ref(), ImageTarget::Texture2D, Viewport::new(0, 1, 1, 1));
    assert_eq!(top_left, Color4B::RED.to_array());
}

#[test]
fn test_cube_face_is_mirrored_not_flipped() {
    let ctx = TestContext::new();
    let path = ctx.write_png("face.png", IntSize::square(2), |x, _| {
        if x == 0 {
            Color4B::RED
        } else {
            Color4B::BLUE
        }
    });

    let config = ctx.library.config();
    let cube = TextureCube::new(ctx.library.backend().clone(), &config);
    cube.load_cube_face(&FileImageDecoder, CubeFace::PositiveZ, &path)
        .unwrap();

    assert!(cube.is_upside_down());
    assert!(!cube.has_mipmap());
    let first = ctx.read_back(&cube, ImageTarget::Face(CubeFace::PositiveZ), Viewport::new(0, 0, 1, 1));
    assert_eq!(first, Color4B::BLUE.to_array());
}

#[test]
fn test_upright_cube_face_is_rotated() {
    let ctx = TestContext::new();
    // Bottom row red, top row blue; left column darker than right.
    let pixels = [
        Color4B::RED,
        Color4B::new(255, 128, 128, 255),
        Color4B::BLUE,
        Color4B::new(128, 128, 255, 255),
    ]
    .iter()
    .flat_map(|c| c.to_array())
    .collect();
    let image = texture_engine::DecodedImage::new(
        IntSize::square(2),
        texture_engine::resources::ContentPixelFormat::Rgba8888,
        pixels,
    )
    .unwrap();

    let cube = TextureCube::new(ctx.library.backend().clone(), &ctx.library.config());
    cube.bind_content(image, ImageTarget::Face(CubeFace::PositiveX))
        .unwrap();

    assert!(cube.is_upside_down());
    let bottom = ctx.read_back(&cube, ImageTarget::Face(CubeFace::PositiveX), Viewport::new(0, 0, 2, 1));
    assert_eq!(
        bottom,
        rgba_bytes(&[Color4B::new(128, 128, 255, 255), Color4B::BLUE])
    );
}

#[test]
fn test_rgb_file_keeps_native_layout() {
    let ctx = TestContext::new();
    let image = image::RgbImage::from_pixel(3, 3, image::Rgb([10, 20, 30]));
    image.save(ctx.dir.path().join("rgb.png")).unwrap();

    let texture = ctx.library.texture_from_file("rgb.png").unwrap();
    assert_eq!(texture.pixel_format(), PixelFormat::Rgb);
    assert_eq!(texture.pixel_type(), PixelType::UnsignedByte);
    assert_eq!(texture.byte_alignment(), 1);
    assert!(!texture.has_alpha());
    assert!(!texture.has_mipmap());
    assert_eq!(texture.wrap_s(), WrapMode::ClampToEdge);
}

#[test]
fn test_padding_reduces_coverage() {
    let ctx = TestContext::with_config(TextureConfig::default().with_pad_to_power_of_two(true));
    ctx.write_solid_png("odd.png", IntSize::new(3, 5), Color4B::WHITE);

    let texture = ctx.library.texture_from_file("odd.png").unwrap();
    assert_eq!(texture.size(), IntSize::new(4, 8));
    assert_eq!(texture.coverage(), Vec2::new(0.75, 0.625));
    assert!(texture.is_pot());
    assert_eq!(texture.wrap_t(), WrapMode::Repeat);
}

// ============================================================================
// Mipmap and Wrap Policy
// ============================================================================

#[test]
fn test_pot_texture_accepts_mipmap() {
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_size(IntSize::square(64), PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    assert_eq!(texture.state(), TextureState::AllocatedEmpty);
    assert!(texture.is_pot());

    texture.generate_mipmap();
    texture.generate_mipmap();
    assert!(texture.has_mipmap());
    assert_eq!(
        ctx.backend.lock().mipmap_generations(texture.handle().unwrap()),
        1
    );
}

#[rstest]
#[case(WrapMode::Repeat)]
#[case(WrapMode::MirroredRepeat)]
fn test_npot_texture_refuses_mipmap_and_repeat(#[case] wrap: WrapMode) {
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_size(IntSize::new(100, 50), PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    assert!(!texture.is_pot());
    assert!(!texture.is_pot_width() && !texture.is_pot_height());

    texture.generate_mipmap();
    assert!(!texture.has_mipmap());

    texture.set_wrap_s(wrap);
    assert_eq!(texture.wrap_s(), WrapMode::ClampToEdge);
    texture.set_wrap_t(wrap);
    assert_eq!(texture.wrap_t(), WrapMode::ClampToEdge);
}

#[test]
fn test_resize_to_pot_restores_requested_wrap() {
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_size(IntSize::new(100, 50), PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    texture.set_wrap_s(WrapMode::MirroredRepeat);
    assert_eq!(texture.wrap_s(), WrapMode::ClampToEdge);

    texture.resize_to(IntSize::new(128, 64)).unwrap();
    assert_eq!(texture.wrap_s(), WrapMode::MirroredRepeat);
    assert_eq!(texture.wrap_t(), WrapMode::Repeat);
}

fn assert_wrap_follows_size(texture: &dyn Texture, requested: WrapMode) {
    let expected = if texture.is_pot() {
        requested
    } else {
        WrapMode::ClampToEdge
    };
    assert_eq!(texture.wrap_s(), expected, "wrap_s at {:?}", texture.size());
    assert_eq!(texture.wrap_t(), expected, "wrap_t at {:?}", texture.size());
    assert_eq!(texture.requested_parameters().wrap_s, requested);
    assert_eq!(texture.requested_parameters().wrap_t, requested);
}

#[rstest]
fn test_repeating_wrap_only_on_pot_sizes(
    #[values(
        (IntSize::new(100, 50), IntSize::new(128, 64)),
        (IntSize::new(128, 64), IntSize::new(100, 50)),
        (IntSize::square(64), IntSize::new(64, 48))
    )]
    sizes: (IntSize, IntSize),
    #[values(WrapMode::Repeat, WrapMode::MirroredRepeat)] wrap: WrapMode,
) {
    let (from, to) = sizes;
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_size(from, PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    texture.set_wrap_s(wrap);
    texture.set_wrap_t(wrap);
    assert_wrap_follows_size(texture.as_ref(), wrap);

    texture.set_min_filter(texture_engine::MinFilter::Nearest);
    texture.set_mag_filter(texture_engine::MagFilter::Nearest);
    assert_wrap_follows_size(texture.as_ref(), wrap);

    texture.resize_to(to).unwrap();
    assert_wrap_follows_size(texture.as_ref(), wrap);

    texture.resize_to(from).unwrap();
    assert_wrap_follows_size(texture.as_ref(), wrap);
}

#[test]
fn test_setter_on_unallocated_texture_keeps_default_wrap() {
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_pixel_format(PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    texture.set_mag_filter(texture_engine::MagFilter::Nearest);
    assert_eq!(texture.wrap_s(), WrapMode::ClampToEdge);

    texture.resize_to(IntSize::square(16)).unwrap();
    assert_eq!(texture.wrap_s(), WrapMode::Repeat);
    assert_eq!(texture.wrap_t(), WrapMode::Repeat);
    assert_eq!(texture.mag_filter(), texture_engine::MagFilter::Nearest);
}

#[test]
fn test_resize_discards_content_and_mipmap() {
    let ctx = TestContext::new();
    ctx.write_solid_png("square.png", IntSize::square(8), Color4B::RED);
    let texture = ctx.library.texture_from_file("square.png").unwrap();
    assert!(texture.has_mipmap());

    texture.resize_to(IntSize::new(100, 50)).unwrap();
    assert_eq!(texture.state(), TextureState::AllocatedEmpty);
    assert_eq!(texture.size(), IntSize::new(100, 50));
    assert!(!texture.has_mipmap());
    assert_eq!(texture.coverage(), Vec2::ONE);
}

#[test]
fn test_bound_parameters_follow_policy() {
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_size(IntSize::new(100, 50), PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    let mut visitor = TextureUnitCounter::new();
    texture.bind(&mut visitor).unwrap();

    let backend = ctx.backend.lock();
    let writes = backend.parameter_writes(texture.handle().unwrap());
    assert!(writes.contains(&texture_engine::backend::TextureParameter::WrapS(
        WrapMode::ClampToEdge
    )));
    assert!(writes.contains(&texture_engine::backend::TextureParameter::MinFilter(
        texture_engine::MinFilter::Linear
    )));
}

// ============================================================================
// Pixel Replacement
// ============================================================================

#[test]
fn test_replace_pixels_rgba_roundtrip() {
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_size(IntSize::square(64), PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    texture.generate_mipmap();

    let rect = Viewport::new(3, 5, 4, 2);
    let original = test_pattern(rect.pixel_count());
    let mut pixels = original.clone();
    texture
        .replace_pixels(rect, ImageTarget::Texture2D, &mut pixels)
        .unwrap();

    assert_eq!(
        ctx.read_back(texture.as_ref(), ImageTarget::Texture2D, rect),
        rgba_bytes(&original)
    );
    assert_eq!(texture.state(), TextureState::AllocatedContent);
    // The mipmap is stale but not regenerated.
    assert!(texture.has_mipmap());
    assert_eq!(
        ctx.backend.lock().mipmap_generations(texture.handle().unwrap()),
        1
    );
}

#[rstest]
#[case(PixelFormat::Rgb, PixelType::UnsignedByte, 0, false)]
#[case(PixelFormat::Rgb, PixelType::UnsignedShort565, 8, false)]
#[case(PixelFormat::Rgba, PixelType::UnsignedShort4444, 15, true)]
#[case(PixelFormat::Rgba, PixelType::UnsignedShort5551, 8, false)]
fn test_replace_pixels_quantized_roundtrip(
    #[case] format: PixelFormat,
    #[case] ty: PixelType,
    #[case] tolerance: u8,
    #[case] check_alpha: bool,
) {
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_size(IntSize::new(16, 8), format, ty)
        .unwrap();
    let rect = Viewport::new(2, 1, 5, 3);
    let original = test_pattern(rect.pixel_count());
    let mut pixels = original.clone();
    texture
        .replace_pixels(rect, ImageTarget::Texture2D, &mut pixels)
        .unwrap();

    let stored = ctx.read_back(texture.as_ref(), ImageTarget::Texture2D, rect);
    let back = unpack_to_rgba8888(&stored, format, ty).unwrap();
    assert_eq!(back.len(), original.len());
    for (expected, actual) in original.iter().zip(&back) {
        assert!(expected.r.abs_diff(actual.r) <= tolerance, "{expected:?} vs {actual:?}");
        assert!(expected.g.abs_diff(actual.g) <= tolerance, "{expected:?} vs {actual:?}");
        assert!(expected.b.abs_diff(actual.b) <= tolerance, "{expected:?} vs {actual:?}");
        if check_alpha {
            assert!(expected.a.abs_diff(actual.a) <= tolerance, "{expected:?} vs {actual:?}");
        }
    }
}

#[test]
fn test_replace_pixels_rejects_bad_requests() {
    let ctx = TestContext::new();
    let unallocated = ctx
        .library
        .texture_with_pixel_format(PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    let mut one = vec![Color4B::WHITE];
    assert_eq!(
        unallocated.replace_pixels(Viewport::new(0, 0, 1, 1), ImageTarget::Texture2D, &mut one),
        Err(TextureError::NotAllocated)
    );

    unallocated.resize_to(IntSize::square(4)).unwrap();
    assert!(matches!(
        unallocated.replace_pixels(Viewport::new(4, 0, 1, 1), ImageTarget::Texture2D, &mut one),
        Err(TextureError::RegionOutOfBounds { .. })
    ));
    assert_eq!(
        unallocated.replace_pixels(Viewport::new(0, 0, 2, 1), ImageTarget::Texture2D, &mut one),
        Err(TextureError::PixelCountMismatch {
            expected: 2,
            actual: 1
        })
    );
    assert!(matches!(
        unallocated.replace_pixels(
            Viewport::new(0, 0, 1, 1),
            ImageTarget::Face(CubeFace::PositiveX),
            &mut one
        ),
        Err(TextureError::InvalidTarget { .. })
    ));
    assert_eq!(unallocated.state(), TextureState::AllocatedEmpty);

    unallocated.delete_gpu_texture();
    assert_eq!(
        unallocated.replace_pixels(Viewport::new(0, 0, 1, 1), ImageTarget::Texture2D, &mut one),
        Err(TextureError::NotAllocated)
    );
}

#[test]
fn test_replace_cube_face() {
    let ctx = TestContext::new();
    let cube = ctx
        .library
        .texture_cube_with_side_length(4, PixelFormat::Rgba, PixelType::UnsignedByte)
        .unwrap();
    let target = ImageTarget::Face(CubeFace::NegativeY);
    let mut pixels = vec![Color4B::YELLOW; 4];
    cube.replace_pixels(Viewport::new(1, 1, 2, 2), target, &mut pixels)
        .unwrap();
    assert_eq!(
        ctx.read_back(cube.as_ref(), target, Viewport::new(2, 2, 1, 1)),
        Color4B::YELLOW.to_array()
    );
    assert_eq!(
        ctx.read_back(cube.as_ref(), ImageTarget::Face(CubeFace::PositiveY), Viewport::new(2, 2, 1, 1)),
        [0, 0, 0, 0]
    );
}

// ============================================================================
// Binding and Lifetime
// ============================================================================

#[test]
fn test_2d_and_cube_units_count_separately() {
    let ctx = TestContext::new();
    let flat = ctx.library.texture_with_color(IntSize::square(2), Color4B::WHITE).unwrap();
    let other = ctx.library.texture_with_color(IntSize::square(2), Color4B::BLACK).unwrap();
    let cube = ctx.library.texture_cube_colored_for_axes().unwrap();

    let mut visitor = TextureUnitCounter::new();
    flat.bind(&mut visitor).unwrap();
    cube.bind(&mut visitor).unwrap();
    other.bind(&mut visitor).unwrap();

    use texture_engine::DrawingVisitor;
    assert_eq!(visitor.current_texture_unit(TextureKind::Texture2D), 2);
    assert_eq!(visitor.current_texture_unit(TextureKind::Cube), 1);
    assert_eq!(
        ctx.backend.lock().bound_texture(1),
        Some((TextureKind::Texture2D, other.handle().unwrap()))
    );
}

#[test]
fn test_texture_unit_decorator_binds_its_environment() {
    let ctx = TestContext::new();
    ctx.write_solid_png("normals.png", IntSize::square(4), Color4B::new(128, 128, 255, 255));
    let normals = ctx.library.texture_from_file("normals.png").unwrap();
    let unit = TextureUnit::bump_map(Vec3::new(0.0, 1.0, 1.0));
    let bump = ctx
        .library
        .texture_unit_texture(Arc::clone(&normals), Some(unit.clone()));

    assert!(bump.is_bump_map());
    assert!(bump.light_direction().abs_diff_eq(Vec3::new(0.0, 1.0, 1.0).normalize(), 1e-5));
    assert_eq!(bump.handle(), normals.handle());
    assert!(!normals.is_bump_map());

    let mut visitor = TextureUnitCounter::new();
    bump.bind(&mut visitor).unwrap();
    assert_eq!(ctx.backend.lock().bound_environment(0), Some(Some(&unit)));
}

#[test]
fn test_retained_content_outlives_deletion() {
    let ctx = TestContext::with_config(TextureConfig::default().with_retain_content(true));
    ctx.write_solid_png("kept.png", IntSize::new(4, 2), Color4B::GREEN);
    let texture = ctx.library.load_texture_from_file("kept.png").unwrap();
    let handle = texture.handle().unwrap();

    let content = texture.content().unwrap();
    assert_eq!(content.image().size(), IntSize::new(4, 2));
    assert_eq!(content.handle(), Some(handle));

    texture.delete_gpu_texture();
    assert_eq!(texture.state(), TextureState::Deleted);
    assert!(texture.content().is_none());
    assert!(ctx.backend.lock().is_live(handle));

    drop(content);
    assert!(!ctx.backend.lock().is_live(handle));
}

#[test]
fn test_dropping_last_owner_releases_gpu_texture() {
    let ctx = TestContext::new();
    let texture = ctx
        .library
        .texture_with_size(IntSize::square(8), PixelFormat::Alpha, PixelType::UnsignedByte)
        .unwrap();
    let handle = texture.handle().unwrap();
    drop(texture);
    assert_eq!(ctx.backend.lock().destroyed_textures(), &[handle]);
}
