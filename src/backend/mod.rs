//! Backend abstraction layer
//!
//! Provides the graphics-context sink trait and the rendering-API types that
//! textures speak to it in.

pub mod dummy;
pub mod traits;
pub mod types;

pub use dummy::DummyBackend;
pub use traits::*;
pub use types::*;
