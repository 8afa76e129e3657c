//! Annotation state and overlay geometry for a browser PDF viewer.
//!
//! pdf.js renders the pages; this crate keeps the session (page, zoom,
//! rotation, tool, annotations), turns pointer gestures into highlights,
//! comments and drawings, and produces the screen-space shapes drawn on top
//! of the page.

pub mod annotation;
mod assembly;
pub mod file_utils;
pub mod gesture;
mod logging;
pub mod overlay;
mod pdfjs_bindings;
pub mod schema;
pub mod session;
pub mod transform;
pub mod viewer;

pub use annotation::{Annotation, AnnotationKind, PagePoint, PageRect};
pub use assembly::{PdfViewer, init_logging, load_pdf, load_pdf_base64};
pub use schema::{ViewerError, ViewerOptions};
pub use session::{DocumentFile, SessionState, Tool};
pub use viewer::{Viewer, ViewerAction};
