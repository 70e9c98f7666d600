//! Label types and geometry.
//!
//! Geometry is always stored in image coordinates.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, bounding_box};

/// Unique identifier for a label within a store.
pub type LabelId = u64;

/// Identifier of a label class.
pub type ClassId = u32;

/// Minimum number of vertices for a committed line.
pub const MIN_LINE_VERTICES: usize = 2;

/// Minimum number of vertices for a committed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// The kinds of labels a user can work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    #[default]
    Rect,
    Point,
    Line,
    Polygon,
    /// Whole-image tags.
    ImageRecognition,
}

impl LabelType {
    /// Get the display name for this label type.
    pub fn name(&self) -> &'static str {
        match self {
            LabelType::Rect => "Rect",
            LabelType::Point => "Point",
            LabelType::Line => "Line",
            LabelType::Polygon => "Polygon",
            LabelType::ImageRecognition => "Image recognition",
        }
    }

    pub fn all() -> &'static [LabelType] {
        &[
            LabelType::Rect,
            LabelType::Point,
            LabelType::Line,
            LabelType::Polygon,
            LabelType::ImageRecognition,
        ]
    }
}

/// Review status. Only AI suggestions start out as `Proposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelStatus {
    Proposed,
    #[default]
    Accepted,
    Rejected,
}

/// Shape of a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point { position: Point },
    Rect { rect: Rect },
    Line { points: Vec<Point> },
    Polygon { points: Vec<Point> },
}

impl Geometry {
    pub fn label_type(&self) -> LabelType {
        match self {
            Geometry::Point { .. } => LabelType::Point,
            Geometry::Rect { .. } => LabelType::Rect,
            Geometry::Line { .. } => LabelType::Line,
            Geometry::Polygon { .. } => LabelType::Polygon,
        }
    }

    /// Whether the geometry satisfies its minimum vertex count.
    pub fn is_valid(&self) -> bool {
        match self {
            Geometry::Point { .. } | Geometry::Rect { .. } => true,
            Geometry::Line { points } => points.len() >= MIN_LINE_VERTICES,
            Geometry::Polygon { points } => points.len() >= MIN_POLYGON_VERTICES,
        }
    }

    /// Vertices of a line or polygon; empty for points and rects.
    pub fn vertices(&self) -> &[Point] {
        match self {
            Geometry::Line { points } | Geometry::Polygon { points } => points,
            Geometry::Point { .. } | Geometry::Rect { .. } => &[],
        }
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        match self {
            Geometry::Point { position } => Some(Rect::from_corners(*position, *position)),
            Geometry::Rect { rect } => Some(*rect),
            Geometry::Line { points } | Geometry::Polygon { points } => bounding_box(points),
        }
    }
}

/// A committed label on an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub class_id: Option<ClassId>,
    pub status: LabelStatus,
    pub visible: bool,
    pub geometry: Geometry,
}

impl Label {
    pub fn label_type(&self) -> LabelType {
        self.geometry.label_type()
    }
}

/// A partial update applied through the store's mutate operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelPatch {
    pub geometry: Option<Geometry>,
    pub class_id: Option<Option<ClassId>>,
    pub status: Option<LabelStatus>,
}

impl LabelPatch {
    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Self::default()
        }
    }

    pub fn class(class_id: Option<ClassId>) -> Self {
        Self {
            class_id: Some(class_id),
            ..Self::default()
        }
    }

    pub fn status(status: LabelStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply the patch to `label`.
    ///
    /// A geometry of a different label type or below its minimum vertex count
    /// leaves the label untouched and returns `false`.
    pub fn apply(self, label: &mut Label) -> bool {
        if let Some(geometry) = &self.geometry {
            if geometry.label_type() != label.label_type() || !geometry.is_valid() {
                return false;
            }
        }
        if let Some(geometry) = self.geometry {
            label.geometry = geometry;
        }
        if let Some(class_id) = self.class_id {
            label.class_id = class_id;
        }
        if let Some(status) = self.status {
            label.status = status;
        }
        true
    }
}
