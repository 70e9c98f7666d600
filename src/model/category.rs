//! Label classes ("categories") with display colors.

use serde::{Deserialize, Serialize};

use super::ClassId;

/// A label class with a name and color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier for the class
    pub id: ClassId,
    /// Display name of the class
    pub name: String,
    /// RGB color for the class
    pub color: [u8; 3],
}

impl Category {
    /// Create a new class with the given ID, name, and color.
    pub fn new(id: ClassId, name: &str, color: [u8; 3]) -> Self {
        Self {
            id,
            name: name.to_string(),
            color,
        }
    }
}

/// Default classes for a fresh configuration.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(1, "Object", [255, 99, 71]),
        Category::new(2, "Person", [60, 179, 113]),
        Category::new(3, "Vehicle", [65, 105, 225]),
    ]
}
