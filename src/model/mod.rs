//! Data models for labelkit.

mod category;
mod label;

pub use category::{Category, default_categories};
pub use label::{
    ClassId, Geometry, Label, LabelId, LabelPatch, LabelStatus, LabelType, MIN_LINE_VERTICES,
    MIN_POLYGON_VERTICES,
};
