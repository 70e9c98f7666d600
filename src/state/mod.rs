//! Editor state: label storage and the interactive session.

mod image_data;
mod session;

pub use image_data::{ImageData, ImageFilter, ImageId, LabelStore};
pub use session::EditorSession;
