pub mod edit;
pub mod editor;
pub mod handles;
pub mod input;
pub mod shortcuts;
pub mod tools;
pub mod viewer;

pub use editor::{AnnotationEditor, Cursor, EditorEvent, EditorMode, InputResponse, PopupInfo};
pub use input::{ImageEvent, InputEvent, Modifiers};
pub use tools::{DrawOptions, DrawingSession};
pub use viewer::{ImageViewer, TransformViewer};
