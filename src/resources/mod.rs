//! Texture resources
//!
//! Decoded images, the texture variants that upload them, the texture cache
//! and the factory tying them together.

pub mod cache;
pub mod image;
pub mod library;
pub mod pixel_format;
pub mod texture;
pub mod texture_2d;
pub mod texture_core;
pub mod texture_cube;
pub mod texture_unit;

pub use cache::{CacheRetention, TextureCache};
pub use self::image::{DecodedFile, DecodedImage, FileImageDecoder, ImageDecoder};
pub use library::{texture_name_from_file_path, TextureLibrary, TextureRequest};
pub use pixel_format::ContentPixelFormat;
pub use texture::{
    same_texture, DrawingVisitor, Texture, TextureClass, TextureState, TextureUnitCounter,
};
pub use texture_2d::Texture2D;
pub use texture_core::TextureContent;
pub use texture_cube::{cube_face_paths, cube_name_from_pattern, TextureCube};
pub use texture_unit::{
    CombineFunction, TextureEnvironmentMode, TextureUnit, TextureUnitTexture,
};
