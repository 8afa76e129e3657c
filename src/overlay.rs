//! Screen-space overlay shapes.
//!
//! The JS layer draws whatever this module returns on top of the pdf.js page
//! bitmap: boxes for highlights, markers for comments and SVG paths for
//! drawings. Previews of in-progress gestures use the same shapes with
//! `preview` set and are never part of the annotation collection.

use crate::annotation::{Annotation, AnnotationBody, AnnotationId};
use crate::gesture::GestureTracker;
use crate::session::Tool;
use crate::transform::{ScreenPoint, ScreenRect, Transform};
use serde::Serialize;

/// Stroke used for drawings that carry no color of their own.
pub const DEFAULT_STROKE: &str = "red";
pub const STROKE_WIDTH: f64 = 2.0;
/// Opacity of the box shown while a highlight is being dragged.
pub const PREVIEW_OPACITY: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OverlayShape {
    Highlight {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<AnnotationId>,
        rect: ScreenRect,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        opacity: Option<f64>,
    },
    Comment {
        id: AnnotationId,
        anchor: ScreenPoint,
        content: String,
    },
    Drawing {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<AnnotationId>,
        path: String,
        stroke: String,
        stroke_width: f64,
    },
}

impl OverlayShape {
    pub fn is_preview(&self) -> bool {
        match self {
            OverlayShape::Highlight { id, .. } | OverlayShape::Drawing { id, .. } => id.is_none(),
            OverlayShape::Comment { .. } => false,
        }
    }
}

/// Shape for one committed annotation, or `None` for drawings that are too
/// short to draw.
pub fn render_annotation(annotation: &Annotation, transform: &Transform) -> Option<OverlayShape> {
    let id = annotation.id();
    match annotation.body() {
        AnnotationBody::Highlight { rect } => Some(OverlayShape::Highlight {
            id: Some(id),
            rect: transform.rect_to_screen(*rect),
            color: annotation.color().map(str::to_owned),
            opacity: None,
        }),
        AnnotationBody::Comment { anchor, content } => Some(OverlayShape::Comment {
            id,
            anchor: transform.to_screen(*anchor),
            content: content.clone(),
        }),
        AnnotationBody::Drawing { points } => {
            if points.len() < 2 {
                return None;
            }
            Some(OverlayShape::Drawing {
                id: Some(id),
                path: transform.path_data(points),
                stroke: annotation.color().unwrap_or(DEFAULT_STROKE).to_owned(),
                stroke_width: STROKE_WIDTH,
            })
        }
    }
}

pub fn render_annotations<'a>(
    annotations: impl IntoIterator<Item = &'a Annotation>,
    transform: &Transform,
) -> Vec<OverlayShape> {
    annotations
        .into_iter()
        .filter_map(|a| render_annotation(a, transform))
        .collect()
}

/// Live preview for the gesture in progress, if there is anything to show.
///
/// Highlight selections show a translucent box once the pointer has moved;
/// drawings show the partial polyline once they have two points. Comment
/// selections have no preview.
pub fn render_preview(
    tracker: &GestureTracker,
    tool: Tool,
    transform: &Transform,
    highlight_color: Option<&str>,
    drawing_color: Option<&str>,
) -> Option<OverlayShape> {
    match tool {
        Tool::Highlight => tracker.selection_rect().map(|rect| OverlayShape::Highlight {
            id: None,
            rect: transform.rect_to_screen(rect),
            color: highlight_color.map(str::to_owned),
            opacity: Some(PREVIEW_OPACITY),
        }),
        Tool::Drawing => {
            let points = tracker.drawing_points()?;
            if points.len() < 2 {
                return None;
            }
            Some(OverlayShape::Drawing {
                id: None,
                path: transform.path_data(points),
                stroke: drawing_color.unwrap_or(DEFAULT_STROKE).to_owned(),
                stroke_width: STROKE_WIDTH,
            })
        }
        Tool::Cursor | Tool::Comment => None,
    }
}
