//! AI-suggested labels.
//!
//! Suggestions enter the store as `Proposed` labels. The user accepts them
//! (they become regular labels) or rejects them (they are removed).

use serde::{Deserialize, Serialize};

use crate::model::{ClassId, Geometry, LabelId, LabelPatch, LabelStatus};
use crate::state::{ImageId, LabelStore};

/// One suggested shape from a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub class_id: Option<ClassId>,
    pub geometry: Geometry,
}

/// Store a batch of suggestions on an image. Invalid shapes are skipped.
///
/// Returns the ids of the stored labels in batch order.
pub fn ingest(
    store: &mut LabelStore,
    image: ImageId,
    batch: impl IntoIterator<Item = Suggestion>,
) -> Vec<LabelId> {
    let ids: Vec<LabelId> = batch
        .into_iter()
        .filter_map(|s| store.commit(image, s.class_id, LabelStatus::Proposed, s.geometry))
        .collect();
    log::info!("Ingested {} suggestions on image {}", ids.len(), image);
    ids
}

fn proposed_ids(store: &LabelStore, image: ImageId) -> Vec<LabelId> {
    store
        .labels(image)
        .iter()
        .filter(|l| l.status == LabelStatus::Proposed)
        .map(|l| l.id)
        .collect()
}

/// Accept one proposed label. Returns false if it is not a pending suggestion.
pub fn accept(store: &mut LabelStore, image: ImageId, id: LabelId) -> bool {
    let pending = store
        .label(image, id)
        .is_some_and(|l| l.status == LabelStatus::Proposed);
    pending && store.mutate(image, id, LabelPatch::status(LabelStatus::Accepted))
}

/// Reject one proposed label, removing it from the store.
pub fn reject(store: &mut LabelStore, image: ImageId, id: LabelId) -> bool {
    let pending = store
        .label(image, id)
        .is_some_and(|l| l.status == LabelStatus::Proposed);
    pending && store.delete(image, id).is_some()
}

/// Accept every pending suggestion on an image. Returns how many were accepted.
pub fn accept_all(store: &mut LabelStore, image: ImageId) -> usize {
    let ids = proposed_ids(store, image);
    let count = ids.iter().filter(|id| accept(store, image, **id)).count();
    log::info!("Accepted {} suggestions on image {}", count, image);
    count
}

/// Reject every pending suggestion on an image. Returns how many were removed.
pub fn reject_all(store: &mut LabelStore, image: ImageId) -> usize {
    let ids = proposed_ids(store, image);
    let count = ids.iter().filter(|id| reject(store, image, **id)).count();
    log::info!("Rejected {} suggestions on image {}", count, image);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};

    fn batch() -> Vec<Suggestion> {
        vec![
            Suggestion {
                class_id: Some(1),
                geometry: Geometry::Rect {
                    rect: Rect::from_xywh(0.0, 0.0, 10.0, 10.0),
                },
            },
            Suggestion {
                class_id: Some(2),
                geometry: Geometry::Point {
                    position: Point::new(5.0, 5.0),
                },
            },
            // Too few vertices, skipped
            Suggestion {
                class_id: None,
                geometry: Geometry::Polygon { points: vec![] },
            },
        ]
    }

    fn setup() -> (LabelStore, ImageId) {
        let mut store = LabelStore::new();
        let image = store.add_image("a.png", 100, 100);
        store.commit(
            image,
            None,
            LabelStatus::Accepted,
            Geometry::Point {
                position: Point::new(1.0, 1.0),
            },
        );
        (store, image)
    }

    #[test]
    fn test_ingest_stores_proposed() {
        let (mut store, image) = setup();
        let ids = ingest(&mut store, image, batch());
        assert_eq!(ids.len(), 2);
        for id in ids {
            assert_eq!(store.label(image, id).unwrap().status, LabelStatus::Proposed);
        }
    }

    #[test]
    fn test_accept_all() {
        let (mut store, image) = setup();
        ingest(&mut store, image, batch());
        assert_eq!(accept_all(&mut store, image), 2);
        assert!(store.labels(image).iter().all(|l| l.status == LabelStatus::Accepted));
        assert_eq!(store.labels(image).len(), 3);
        assert_eq!(accept_all(&mut store, image), 0);
    }

    #[test]
    fn test_reject_all_keeps_user_labels() {
        let (mut store, image) = setup();
        ingest(&mut store, image, batch());
        assert_eq!(reject_all(&mut store, image), 2);
        assert_eq!(store.labels(image).len(), 1);
        assert_eq!(store.labels(image)[0].status, LabelStatus::Accepted);
    }

    #[test]
    fn test_single_accept_and_reject() {
        let (mut store, image) = setup();
        let user_label = store.labels(image)[0].id;
        let ids = ingest(&mut store, image, batch());

        assert!(accept(&mut store, image, ids[0]));
        assert!(!accept(&mut store, image, ids[0]));
        assert!(reject(&mut store, image, ids[1]));
        assert!(store.label(image, ids[1]).is_none());
        // Only suggestions can be rejected
        assert!(!reject(&mut store, image, user_label));
    }
}
