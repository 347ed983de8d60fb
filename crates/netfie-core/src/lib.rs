//! Netfie Core Library
//!
//! Platform-agnostic editing session for the Netfie image editor: drawable
//! objects, snapshot undo/redo, selection and property sync, tool modes and
//! media intake. Drawing is delegated to an injected [`RenderSurface`].

pub mod history;
pub mod media;
pub mod properties;
pub mod scene;
pub mod session;
pub mod shapes;
pub mod surface;
pub mod tools;

pub use history::{History, Snapshot};
pub use media::{
    MediaError, MediaFile, MediaKind, MediaSlot, MemoryUrlStore, ObjectUrl, ObjectUrlStore, validate,
};
pub use properties::{PropertyPanel, PropertyPatch};
pub use scene::{Scene, SceneError, SceneState};
pub use session::{CanvasPreset, EditorSession, ObjectSpec, SessionConfig};
pub use shapes::{Drawable, ObjectId, SerializableColor, ShapePreset, ShapeStyle, ShapeTrait};
pub use surface::{
    NullSurface, RasterFormat, RasterOptions, RenderContext, RenderSurface, SurfaceError,
};
pub use tools::{Brush, ToolKind, ToolManager};
