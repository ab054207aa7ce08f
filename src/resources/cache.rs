//! Name-keyed texture cache.
//!
//! Entries added while the cache is preloading hold their texture strongly
//! and stay until removed. All other entries hold a weak reference and vanish
//! once the last outside owner drops the texture. Dead weak entries are pruned
//! lazily on lookup and insertion, or explicitly with [`TextureCache::prune`].

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{TextureError, TextureResult};
use crate::resources::texture::{same_texture, Texture, TextureClass};

/// How a cache entry holds its texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheRetention {
    /// Pinned until explicitly removed.
    Strong,
    /// Dropped with the last outside owner.
    Weak,
}

enum CacheEntry {
    Strong(Arc<dyn Texture>),
    Weak(Weak<dyn Texture>),
}

impl CacheEntry {
    fn upgrade(&self) -> Option<Arc<dyn Texture>> {
        match self {
            CacheEntry::Strong(texture) => Some(Arc::clone(texture)),
            CacheEntry::Weak(texture) => texture.upgrade(),
        }
    }

    fn is_alive(&self) -> bool {
        match self {
            CacheEntry::Strong(_) => true,
            CacheEntry::Weak(texture) => texture.strong_count() > 0,
        }
    }

    fn retention(&self) -> CacheRetention {
        match self {
            CacheEntry::Strong(_) => CacheRetention::Strong,
            CacheEntry::Weak(_) => CacheRetention::Weak,
        }
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    is_preloading: bool,
}

impl CacheInner {
    fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|name, entry| {
            let alive = entry.is_alive();
            if !alive {
                log::debug!("Pruning released texture '{}' from cache", name);
            }
            alive
        });
        before - self.entries.len()
    }
}

/// Cache of textures by name.
#[derive(Default)]
pub struct TextureCache {
    inner: Mutex<CacheInner>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether textures added from now on are pinned in the cache.
    pub fn is_preloading(&self) -> bool {
        self.inner.lock().is_preloading
    }

    pub fn set_preloading(&self, preloading: bool) {
        self.inner.lock().is_preloading = preloading;
    }

    /// Add a texture under its name.
    ///
    /// Fails if a different live texture already has that name; adding the
    /// same texture again changes nothing.
    pub fn add_texture(&self, texture: &Arc<dyn Texture>) -> TextureResult<()> {
        let name = texture.name().ok_or(TextureError::Unnamed)?;
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.entries.get(&name).and_then(CacheEntry::upgrade) {
            if same_texture(&existing, texture) {
                return Ok(());
            }
            log::error!(
                "Texture cache already contains a different texture named '{}'",
                name
            );
            return Err(TextureError::DuplicateName(name));
        }

        let entry = if inner.is_preloading {
            CacheEntry::Strong(Arc::clone(texture))
        } else {
            CacheEntry::Weak(Arc::downgrade(texture))
        };
        log::debug!("Caching texture '{}' ({:?})", name, entry.retention());
        inner.entries.insert(name, entry);
        Ok(())
    }

    /// Look up a texture by name. Never loads anything.
    pub fn get_named(&self, name: &str) -> Option<Arc<dyn Texture>> {
        let mut inner = self.inner.lock();
        let entry = inner.entries.get(name)?;
        match entry.upgrade() {
            Some(texture) => Some(texture),
            None => {
                log::debug!("Pruning released texture '{}' from cache", name);
                inner.entries.remove(name);
                None
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_named(name).is_some()
    }

    /// Retention of the live entry under `name`.
    pub fn retention(&self, name: &str) -> Option<CacheRetention> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(name)
            .filter(|entry| entry.is_alive())
            .map(CacheEntry::retention)
    }

    /// Remove the entry for `texture`, if it is the texture cached under its name.
    pub fn remove_texture(&self, texture: &Arc<dyn Texture>) {
        let Some(name) = texture.name() else {
            return;
        };
        let removed = {
            let mut inner = self.inner.lock();
            let is_same = inner
                .entries
                .get(&name)
                .and_then(CacheEntry::upgrade)
                .is_some_and(|cached| same_texture(&cached, texture));
            if is_same {
                inner.entries.remove(&name)
            } else {
                None
            }
        };
        if removed.is_none() {
            log::warn!("Texture '{}' is not in the cache", name);
        }
    }

    /// Remove the entry under `name`, returning its texture if still alive.
    pub fn remove_named(&self, name: &str) -> Option<Arc<dyn Texture>> {
        let removed = self.inner.lock().entries.remove(name);
        match removed {
            Some(entry) => entry.upgrade(),
            None => {
                log::warn!("Texture '{}' is not in the cache", name);
                None
            }
        }
    }

    /// Remove every entry, or only those of one texture class.
    pub fn remove_all(&self, class: Option<TextureClass>) {
        let removed: Vec<CacheEntry> = {
            let mut inner = self.inner.lock();
            match class {
                None => inner.entries.drain().map(|(_, entry)| entry).collect(),
                Some(class) => {
                    let names: Vec<String> = inner
                        .entries
                        .iter()
                        .filter(|(_, entry)| {
                            entry.upgrade().map_or(true, |t| t.class() == class)
                        })
                        .map(|(name, _)| name.clone())
                        .collect();
                    names
                        .iter()
                        .filter_map(|name| inner.entries.remove(name))
                        .collect()
                }
            }
        };
        log::debug!("Removed {} textures from cache", removed.len());
    }

    /// Drop entries whose texture has been released. Returns how many went.
    pub fn prune(&self) -> usize {
        self.inner.lock().prune()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let inner = self.inner.lock();
        inner.entries.values().filter(|entry| entry.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One line per live entry, sorted by name.
    pub fn description(&self) -> String {
        let inner = self.inner.lock();
        let mut lines: Vec<String> = inner
            .entries
            .iter()
            .filter_map(|(name, entry)| {
                let texture = entry.upgrade()?;
                let size = texture.size();
                Some(format!(
                    "{} ({:?} {}x{}, {:?})",
                    name,
                    texture.class(),
                    size.width,
                    size.height,
                    entry.retention()
                ))
            })
            .collect();
        lines.sort();
        lines.join("\n")
    }
}

impl std::fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("TextureCache")
            .field("entries", &inner.entries.len())
            .field("is_preloading", &inner.is_preloading)
            .finish()
    }
}

static_assertions::assert_impl_all!(TextureCache: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{share_backend, DummyBackend, IntSize, PixelFormat, PixelType};
    use crate::config::TextureConfig;
    use crate::resources::{Texture2D, TextureCube, TextureUnitTexture};

    fn named_2d(name: &str) -> Arc<dyn Texture> {
        let texture = Texture2D::with_size(
            share_backend(DummyBackend::new()),
            &TextureConfig::default(),
            IntSize::square(4),
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
        )
        .unwrap();
        texture.set_name(Some(name.to_string()));
        Arc::new(texture)
    }

    fn named_cube(name: &str) -> Arc<dyn Texture> {
        let texture = TextureCube::new(share_backend(DummyBackend::new()), &TextureConfig::default());
        texture.set_name(Some(name.to_string()));
        Arc::new(texture)
    }

    #[test]
    fn test_duplicate_name_keeps_existing() {
        let cache = TextureCache::new();
        let first = named_2d("stone.png");
        let second = named_2d("stone.png");
        cache.add_texture(&first).unwrap();
        cache.add_texture(&first).unwrap();

        assert_eq!(
            cache.add_texture(&second),
            Err(TextureError::DuplicateName("stone.png".to_string()))
        );
        let cached = cache.get_named("stone.png").unwrap();
        assert!(same_texture(&cached, &first));
    }

    #[test]
    fn test_unnamed_texture_is_rejected() {
        let cache = TextureCache::new();
        let texture: Arc<dyn Texture> = Arc::new(Texture2D::new(
            share_backend(DummyBackend::new()),
            &TextureConfig::default(),
        ));
        assert_eq!(cache.add_texture(&texture), Err(TextureError::Unnamed));
    }

    #[test]
    fn test_weak_entry_disappears_with_owner() {
        let cache = TextureCache::new();
        let texture = named_2d("weak.png");
        cache.add_texture(&texture).unwrap();
        assert_eq!(cache.retention("weak.png"), Some(CacheRetention::Weak));
        assert_eq!(cache.len(), 1);

        drop(texture);
        assert_eq!(cache.len(), 0);
        assert!(cache.get_named("weak.png").is_none());
        assert_eq!(cache.prune(), 0);
    }

    #[test]
    fn test_preloaded_entry_is_pinned() {
        let cache = TextureCache::new();
        cache.set_preloading(true);
        let texture = named_2d("pinned.png");
        cache.add_texture(&texture).unwrap();
        cache.set_preloading(false);
        drop(texture);

        assert!(cache.get_named("pinned.png").is_some());
        assert_eq!(cache.retention("pinned.png"), Some(CacheRetention::Strong));
        assert!(cache.remove_named("pinned.png").is_some());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_dead_entry_can_be_replaced() {
        let cache = TextureCache::new();
        let old = named_2d("reused.png");
        cache.add_texture(&old).unwrap();
        drop(old);
        let new = named_2d("reused.png");
        cache.add_texture(&new).unwrap();
        assert!(same_texture(&cache.get_named("reused.png").unwrap(), &new));
    }

    #[test]
    fn test_remove_texture_checks_identity() {
        let cache = TextureCache::new();
        let cached = named_2d("a.png");
        let impostor = named_2d("a.png");
        cache.add_texture(&cached).unwrap();

        cache.remove_texture(&impostor);
        assert!(cache.contains("a.png"));
        cache.remove_texture(&cached);
        assert!(!cache.contains("a.png"));
    }

    #[test]
    fn test_remove_all_by_class() {
        let cache = TextureCache::new();
        cache.set_preloading(true);
        let flat = named_2d("flat.png");
        let sky = named_cube("sky.png");
        let decorated: Arc<dyn Texture> = Arc::new(TextureUnitTexture::new(named_2d("bump.png")));
        for texture in [&flat, &sky, &decorated] {
            cache.add_texture(texture).unwrap();
        }

        cache.remove_all(Some(TextureClass::TextureCube));
        assert!(!cache.contains("sky.png"));
        assert_eq!(cache.len(), 2);

        cache.remove_all(Some(TextureClass::TextureUnit));
        assert!(!cache.contains("bump.png"));
        assert!(cache.contains("flat.png"));

        cache.remove_all(None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_description_lists_entries() {
        let cache = TextureCache::new();
        let b = named_2d("b.png");
        cache.set_preloading(true);
        let a = named_2d("a.png");
        cache.add_texture(&b).unwrap();
        cache.set_preloading(false);
        cache.add_texture(&a).unwrap();
        assert_eq!(
            cache.description(),
            "a.png (Texture2D 4x4, Weak)\nb.png (Texture2D 4x4, Strong)"
        );
    }
}
