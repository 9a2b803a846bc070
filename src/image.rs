//! Inline images.
//!
//! An image is registered under a short key. The key doubles as a tag
//! name: once `"icon"` is registered, `<icon/>` in the markup embeds it.

use ahash::AHashMap;
use glam::Vec2;
use slotmap::SlotMap;

use crate::SmartString;

slotmap::new_key_type! {
    /// Opaque handle of an image registered in an [`ImageMap`].
    pub struct ImageId;
}

#[derive(Debug, thiserror::Error)]
#[error("missing image with name '{0}'")]
pub struct MissingImage(pub SmartString);

#[derive(Debug, Clone)]
struct ImageInfo {
    name: SmartString,
    size: Vec2,
}

/// The images available to a text, by key.
#[derive(Debug, Clone, Default)]
pub struct ImageMap {
    images: SlotMap<ImageId, ImageInfo>,
    by_name: AHashMap<SmartString, ImageId>,
}

impl ImageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image with its intrinsic size.
    ///
    /// If the image has not loaded yet, pass a zero size and call
    /// [`set_size`](Self::set_size) when the real size is known.
    /// Re-registering a key replaces the previous image.
    pub fn insert(&mut self, name: impl Into<SmartString>, size: Vec2) -> ImageId {
        let name = name.into();
        if let Some(old) = self.by_name.remove(&name) {
            log::warn!("Duplicate images with name '{}'", name);
            self.images.remove(old);
        }
        let id = self.images.insert(ImageInfo {
            name: name.clone(),
            size,
        });
        self.by_name.insert(name, id);
        id
    }

    pub fn remove(&mut self, name: &str) -> Option<ImageId> {
        let id = self.by_name.remove(name)?;
        self.images.remove(id);
        Some(id)
    }

    /// Updates the intrinsic size of an image, e.g. once it finished loading.
    ///
    /// Returns `false` if the image was removed in the meantime.
    pub fn set_size(&mut self, id: ImageId, size: Vec2) -> bool {
        match self.images.get_mut(id) {
            Some(info) => {
                info.size = size;
                true
            }
            None => false,
        }
    }

    /// Gets an image by its key.
    pub fn image_for_name(&self, name: &str) -> Result<ImageId, MissingImage> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| MissingImage(name.into()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// The intrinsic size of an image. Zero for removed images.
    pub fn size(&self, id: ImageId) -> Vec2 {
        self.images.get(id).map(|info| info.size).unwrap_or(Vec2::ZERO)
    }

    pub fn name(&self, id: ImageId) -> Option<&str> {
        self.images.get(id).map(|info| info.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut images = ImageMap::new();
        let id = images.insert("icon", vec2(16., 8.));
        assert_eq!(images.image_for_name("icon").unwrap(), id);
        assert_eq!(images.size(id), vec2(16., 8.));
        assert_eq!(images.name(id), Some("icon"));
        assert!(images.image_for_name("other").is_err());
    }

    #[test]
    fn late_size() {
        let mut images = ImageMap::new();
        let id = images.insert("photo", Vec2::ZERO);
        assert!(images.set_size(id, vec2(100., 50.)));
        assert_eq!(images.size(id), vec2(100., 50.));
    }

    #[test]
    fn reinsert_replaces() {
        let mut images = ImageMap::new();
        let first = images.insert("icon", vec2(1., 1.));
        let second = images.insert("icon", vec2(2., 2.));
        assert_ne!(first, second);
        assert_eq!(images.len(), 1);
        assert_eq!(images.size(first), Vec2::ZERO);
    }
}
