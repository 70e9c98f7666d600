//! Per-image label storage.
//!
//! The store is the only owner of committed labels. Engines and the session go
//! through the narrow commit/mutate/delete/visibility interface so that id
//! uniqueness and geometry validity are enforced in one place.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{ClassId, Geometry, Label, LabelId, LabelPatch, LabelStatus, LabelType};

/// Identifier of an image within the store.
pub type ImageId = u32;

/// Data associated with a specific image (labels, tags, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub id: ImageId,
    /// Display name, usually the file name
    pub name: String,
    /// Image size in pixels
    pub size: (u32, u32),
    /// Labels in creation order
    labels: Vec<Label>,
    /// Classes tagged on the whole image
    tags: BTreeSet<ClassId>,
}

impl ImageData {
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn tags(&self) -> &BTreeSet<ClassId> {
        &self.tags
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    fn label_mut(&mut self, id: LabelId) -> Option<&mut Label> {
        self.labels.iter_mut().find(|l| l.id == id)
    }

    /// Whether the image counts as labelled for `label_type`.
    ///
    /// Rects and points count once one of them is accepted; lines, polygons
    /// and tags count as soon as one exists.
    pub fn is_labeled(&self, label_type: LabelType) -> bool {
        let mut of_type = self.labels.iter().filter(|l| l.label_type() == label_type);
        match label_type {
            LabelType::Rect | LabelType::Point => {
                of_type.any(|l| l.status == LabelStatus::Accepted)
            }
            LabelType::Line | LabelType::Polygon => of_type.next().is_some(),
            LabelType::ImageRecognition => !self.tags.is_empty(),
        }
    }
}

/// Which images an image list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFilter {
    #[default]
    All,
    Labeled,
    Unlabeled,
}

/// Storage for all images and their labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelStore {
    images: Vec<ImageData>,
    next_image_id: ImageId,
    next_label_id: LabelId,
}

impl LabelStore {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            next_image_id: 1,
            next_label_id: 1,
        }
    }

    /// Register an image and return its id.
    pub fn add_image(&mut self, name: impl Into<String>, width: u32, height: u32) -> ImageId {
        let id = self.next_image_id.max(1);
        self.next_image_id = id + 1;
        let name = name.into();
        log::info!("Added image {} '{}' ({}x{})", id, name, width, height);
        self.images.push(ImageData {
            id,
            name,
            size: (width, height),
            labels: Vec::new(),
            tags: BTreeSet::new(),
        });
        id
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn image_ids(&self) -> impl Iterator<Item = ImageId> + '_ {
        self.images.iter().map(|img| img.id)
    }

    pub fn image(&self, image: ImageId) -> Option<&ImageData> {
        self.images.iter().find(|img| img.id == image)
    }

    pub fn is_labeled(&self, image: ImageId, label_type: LabelType) -> bool {
        self.image(image).is_some_and(|d| d.is_labeled(label_type))
    }

    /// Ids of the images matching `filter` for `label_type` whose name
    /// contains `search` (ignoring case), in load order.
    pub fn filter_images(
        &self,
        label_type: LabelType,
        filter: ImageFilter,
        search: &str,
    ) -> Vec<ImageId> {
        let search = search.to_lowercase();
        self.images
            .iter()
            .filter(|d| search.is_empty() || d.name.to_lowercase().contains(&search))
            .filter(|d| match filter {
                ImageFilter::All => true,
                ImageFilter::Labeled => d.is_labeled(label_type),
                ImageFilter::Unlabeled => !d.is_labeled(label_type),
            })
            .map(|d| d.id)
            .collect()
    }

    /// Image at a position in load order.
    pub fn image_at(&self, index: usize) -> Option<&ImageData> {
        self.images.get(index)
    }

    fn image_mut(&mut self, image: ImageId) -> Option<&mut ImageData> {
        self.images.iter_mut().find(|img| img.id == image)
    }

    /// All labels of an image in creation order (empty for unknown images).
    pub fn labels(&self, image: ImageId) -> &[Label] {
        self.image(image).map(ImageData::labels).unwrap_or(&[])
    }

    pub fn label(&self, image: ImageId, id: LabelId) -> Option<&Label> {
        self.image(image)?.label(id)
    }

    /// Visible labels of one type, in creation order.
    pub fn list_visible(
        &self,
        image: ImageId,
        label_type: LabelType,
    ) -> impl DoubleEndedIterator<Item = &Label> + '_ {
        self.labels(image)
            .iter()
            .filter(move |l| l.visible && l.label_type() == label_type)
    }

    /// Insert a new visible label with a fresh id.
    ///
    /// Returns `None` for unknown images and for geometry below its minimum
    /// vertex count.
    pub fn commit(
        &mut self,
        image: ImageId,
        class_id: Option<ClassId>,
        status: LabelStatus,
        geometry: Geometry,
    ) -> Option<LabelId> {
        if !geometry.is_valid() {
            log::warn!("Refusing to commit invalid {:?} geometry", geometry.label_type());
            return None;
        }
        let id = self.next_label_id.max(1);
        let data = self.image_mut(image)?;
        let label_type = geometry.label_type();
        data.labels.push(Label {
            id,
            class_id,
            status,
            visible: true,
            geometry,
        });
        let total = data.labels.len();
        self.next_label_id = id + 1;
        log::info!(
            "Committed {} label {} on image {} (total: {})",
            label_type.name(),
            id,
            image,
            total
        );
        Some(id)
    }

    /// Apply a patch to an existing label. Returns whether anything was applied.
    pub fn mutate(&mut self, image: ImageId, id: LabelId, patch: LabelPatch) -> bool {
        let Some(label) = self.image_mut(image).and_then(|d| d.label_mut(id)) else {
            log::debug!("Mutate ignored: no label {} on image {}", id, image);
            return false;
        };
        patch.apply(label)
    }

    pub fn delete(&mut self, image: ImageId, id: LabelId) -> Option<Label> {
        let data = self.image_mut(image)?;
        let index = data.labels.iter().position(|l| l.id == id)?;
        let removed = data.labels.remove(index);
        log::info!("Deleted label {} from image {}", id, image);
        Some(removed)
    }

    pub fn set_visibility(&mut self, image: ImageId, id: LabelId, visible: bool) -> bool {
        match self.image_mut(image).and_then(|d| d.label_mut(id)) {
            Some(label) => {
                label.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Hide every label if any is visible, otherwise show them all.
    ///
    /// Returns the new visibility.
    pub fn toggle_all_visibility(&mut self, image: ImageId) -> Option<bool> {
        let data = self.image_mut(image)?;
        let visible = !data.labels.iter().any(|l| l.visible);
        for label in &mut data.labels {
            label.visible = visible;
        }
        log::debug!("Image {} labels visible={}", image, visible);
        Some(visible)
    }

    /// Toggle a whole-image tag. Returns whether the tag is now set.
    pub fn toggle_tag(&mut self, image: ImageId, class_id: ClassId) -> Option<bool> {
        let data = self.image_mut(image)?;
        let set = if data.tags.remove(&class_id) {
            false
        } else {
            data.tags.insert(class_id);
            true
        };
        log::info!("Image {} tag {} set={}", image, class_id, set);
        Some(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};

    fn rect(x: f32, y: f32) -> Geometry {
        Geometry::Rect {
            rect: Rect::from_xywh(x, y, 10.0, 10.0),
        }
    }

    #[test]
    fn test_commit_assigns_unique_ids() {
        let mut store = LabelStore::new();
        let a = store.add_image("a.png", 100, 100);
        let b = store.add_image("b.png", 100, 100);
        let id1 = store.commit(a, Some(1), LabelStatus::Accepted, rect(0.0, 0.0)).unwrap();
        let id2 = store.commit(b, Some(1), LabelStatus::Accepted, rect(0.0, 0.0)).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.labels(a).len(), 1);
        assert_eq!(store.labels(b).len(), 1);
        assert!(store.label(a, id1).unwrap().visible);
    }

    #[test]
    fn test_commit_rejects_invalid_geometry_and_unknown_image() {
        let mut store = LabelStore::new();
        let img = store.add_image("a.png", 100, 100);
        let short = Geometry::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        };
        assert!(store.commit(img, None, LabelStatus::Accepted, short).is_none());
        assert!(store.commit(99, None, LabelStatus::Accepted, rect(0.0, 0.0)).is_none());
        assert!(store.labels(img).is_empty());
    }

    #[test]
    fn test_list_visible_filters_type_and_visibility() {
        let mut store = LabelStore::new();
        let img = store.add_image("a.png", 100, 100);
        let r1 = store.commit(img, None, LabelStatus::Accepted, rect(0.0, 0.0)).unwrap();
        let r2 = store.commit(img, None, LabelStatus::Accepted, rect(5.0, 5.0)).unwrap();
        store.commit(
            img,
            None,
            LabelStatus::Accepted,
            Geometry::Point {
                position: Point::new(1.0, 1.0),
            },
        );
        store.set_visibility(img, r1, false);

        let ids: Vec<_> = store.list_visible(img, LabelType::Rect).map(|l| l.id).collect();
        assert_eq!(ids, vec![r2]);
    }

    #[test]
    fn test_delete_and_mutate() {
        let mut store = LabelStore::new();
        let img = store.add_image("a.png", 100, 100);
        let id = store.commit(img, Some(2), LabelStatus::Accepted, rect(0.0, 0.0)).unwrap();

        assert!(store.mutate(img, id, LabelPatch::geometry(rect(20.0, 20.0))));
        assert_eq!(store.label(img, id).unwrap().geometry, rect(20.0, 20.0));
        assert!(!store.mutate(img, id + 100, LabelPatch::class(None)));

        let removed = store.delete(img, id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.delete(img, id).is_none());
    }

    #[test]
    fn test_toggle_all_visibility() {
        let mut store = LabelStore::new();
        let img = store.add_image("a.png", 100, 100);
        let id1 = store.commit(img, None, LabelStatus::Accepted, rect(0.0, 0.0)).unwrap();
        store.commit(img, None, LabelStatus::Accepted, rect(5.0, 5.0)).unwrap();
        store.set_visibility(img, id1, false);

        // One still visible -> hide all
        assert_eq!(store.toggle_all_visibility(img), Some(false));
        assert!(store.labels(img).iter().all(|l| !l.visible));
        assert_eq!(store.toggle_all_visibility(img), Some(true));
        assert!(store.labels(img).iter().all(|l| l.visible));
    }

    #[test]
    fn test_toggle_tag() {
        let mut store = LabelStore::new();
        let img = store.add_image("a.png", 100, 100);
        assert_eq!(store.toggle_tag(img, 3), Some(true));
        assert!(store.image(img).unwrap().tags().contains(&3));
        assert_eq!(store.toggle_tag(img, 3), Some(false));
        assert_eq!(store.toggle_tag(42, 3), None);
    }

    #[test]
    fn test_is_labeled_per_label_type() {
        let mut store = LabelStore::new();
        let img = store.add_image("a.png", 100, 100);
        for label_type in LabelType::all() {
            assert!(!store.is_labeled(img, *label_type));
        }

        // Proposed rects and points do not count until accepted
        let proposed = store.commit(img, None, LabelStatus::Proposed, rect(0.0, 0.0)).unwrap();
        let point = Geometry::Point {
            position: Point::new(5.0, 5.0),
        };
        store.commit(img, None, LabelStatus::Proposed, point);
        assert!(!store.is_labeled(img, LabelType::Rect));
        assert!(!store.is_labeled(img, LabelType::Point));
        store.mutate(img, proposed, LabelPatch::status(LabelStatus::Accepted));
        assert!(store.is_labeled(img, LabelType::Rect));
        assert!(!store.is_labeled(img, LabelType::Point));

        // Any line or polygon counts
        let line = Geometry::Line {
            points: vec![Point::new(0.0, 0.0), Point::new(9.0, 9.0)],
        };
        store.commit(img, None, LabelStatus::Proposed, line);
        assert!(store.is_labeled(img, LabelType::Line));
        assert!(!store.is_labeled(img, LabelType::Polygon));

        store.toggle_tag(img, 2);
        assert!(store.is_labeled(img, LabelType::ImageRecognition));
        assert!(!store.is_labeled(99, LabelType::Rect));
    }

    #[test]
    fn test_filter_images_by_status_and_name() {
        let mut store = LabelStore::new();
        let cat = store.add_image("Cat_01.png", 100, 100);
        let dog = store.add_image("dog_01.png", 100, 100);
        let cat2 = store.add_image("cat_02.png", 100, 100);
        store.commit(cat, Some(1), LabelStatus::Accepted, rect(0.0, 0.0));
        store.commit(dog, Some(1), LabelStatus::Proposed, rect(0.0, 0.0));

        assert_eq!(
            store.filter_images(LabelType::Rect, ImageFilter::All, ""),
            vec![cat, dog, cat2]
        );
        assert_eq!(
            store.filter_images(LabelType::Rect, ImageFilter::Labeled, ""),
            vec![cat]
        );
        assert_eq!(
            store.filter_images(LabelType::Rect, ImageFilter::Unlabeled, ""),
            vec![dog, cat2]
        );
        assert_eq!(
            store.filter_images(LabelType::Rect, ImageFilter::Unlabeled, "CAT"),
            vec![cat2]
        );
        assert!(store.filter_images(LabelType::Line, ImageFilter::Labeled, "").is_empty());
    }
}
