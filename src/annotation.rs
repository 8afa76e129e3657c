//! Annotation data model.
//!
//! All coordinates are stored in page space: PDF-native units, independent
//! of zoom and rotation, origin at the top-left of the unrotated page.
//! Annotations are immutable once built; the session only ever appends them.

use crate::schema::ViewerError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an annotation, generated at creation.
pub type AnnotationId = Uuid;

/// Point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
}

impl PagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageRect {
    /// Bounding box of two opposite corners, in any drag direction.
    pub fn from_corners(a: PagePoint, b: PagePoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Highlight,
    Comment,
    Drawing,
}

/// Type-specific geometry and content.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationBody {
    Highlight { rect: PageRect },
    Comment { anchor: PagePoint, content: String },
    Drawing { points: Vec<PagePoint> },
}

/// Anchor as exposed to JavaScript: `{x, y}` plus extents for highlights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// A single piece of user markup anchored to one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "AnnotationRecord")]
pub struct Annotation {
    id: AnnotationId,
    page_number: u32,
    body: AnnotationBody,
    color: Option<String>,
}

impl Annotation {
    fn new(page_number: u32, body: AnnotationBody, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_number,
            body,
            color,
        }
    }

    pub fn highlight(page_number: u32, rect: PageRect, color: Option<String>) -> Self {
        Self::new(page_number, AnnotationBody::Highlight { rect }, color)
    }

    pub fn comment(page_number: u32, anchor: PagePoint, content: impl Into<String>) -> Self {
        let content = content.into();
        Self::new(page_number, AnnotationBody::Comment { anchor, content }, None)
    }

    pub fn drawing(page_number: u32, points: Vec<PagePoint>, color: Option<String>) -> Self {
        Self::new(page_number, AnnotationBody::Drawing { points }, color)
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn body(&self) -> &AnnotationBody {
        &self.body
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn kind(&self) -> AnnotationKind {
        match self.body {
            AnnotationBody::Highlight { .. } => AnnotationKind::Highlight,
            AnnotationBody::Comment { .. } => AnnotationKind::Comment,
            AnnotationBody::Drawing { .. } => AnnotationKind::Drawing,
        }
    }

    /// Page-space anchor. Drawings carry their own points and report the
    /// origin as a placeholder.
    pub fn position(&self) -> Position {
        match &self.body {
            AnnotationBody::Highlight { rect } => Position {
                x: rect.x,
                y: rect.y,
                width: Some(rect.width),
                height: Some(rect.height),
            },
            AnnotationBody::Comment { anchor, .. } => Position {
                x: anchor.x,
                y: anchor.y,
                width: None,
                height: None,
            },
            AnnotationBody::Drawing { .. } => Position {
                x: 0.0,
                y: 0.0,
                width: None,
                height: None,
            },
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.body {
            AnnotationBody::Comment { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn points(&self) -> Option<&[PagePoint]> {
        match &self.body {
            AnnotationBody::Drawing { points } => Some(points),
            _ => None,
        }
    }

    /// Checks the per-type shape requirements.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.page_number == 0 {
            return Err(ViewerError::InvalidAnnotation(
                "page numbers start at 1".into(),
            ));
        }
        match &self.body {
            AnnotationBody::Highlight { rect } => {
                let values = [rect.x, rect.y, rect.width, rect.height];
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(ViewerError::InvalidAnnotation(
                        "highlight has non-finite coordinates".into(),
                    ));
                }
                if rect.width <= 0.0 || rect.height <= 0.0 {
                    return Err(ViewerError::InvalidAnnotation(
                        "highlight needs a positive width and height".into(),
                    ));
                }
            }
            AnnotationBody::Comment { anchor, content } => {
                if !anchor.x.is_finite() || !anchor.y.is_finite() {
                    return Err(ViewerError::InvalidAnnotation(
                        "comment anchor is not finite".into(),
                    ));
                }
                if content.is_empty() {
                    return Err(ViewerError::InvalidAnnotation("comment has no text".into()));
                }
            }
            AnnotationBody::Drawing { points } => {
                if points.len() < 2 {
                    return Err(ViewerError::InvalidAnnotation(format!(
                        "drawing needs at least 2 points, got {}",
                        points.len()
                    )));
                }
                if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                    return Err(ViewerError::InvalidAnnotation(
                        "drawing has non-finite points".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Short label for annotation lists.
    pub fn summary(&self) -> String {
        const PREVIEW_CHARS: usize = 20;
        match &self.body {
            AnnotationBody::Highlight { .. } => {
                format!("Highlight on page {}", self.page_number)
            }
            AnnotationBody::Comment { content, .. } => {
                let preview: String = content.chars().take(PREVIEW_CHARS).collect();
                if content.chars().count() > PREVIEW_CHARS {
                    format!("Comment: {}...", preview)
                } else {
                    format!("Comment: {}", preview)
                }
            }
            AnnotationBody::Drawing { .. } => format!("Drawing on page {}", self.page_number),
        }
    }
}

/// Flat JSON shape handed to JavaScript.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationRecord {
    id: String,
    #[serde(rename = "type")]
    kind: AnnotationKind,
    page_number: u32,
    position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points: Option<Vec<PagePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

impl From<Annotation> for AnnotationRecord {
    fn from(annotation: Annotation) -> Self {
        Self {
            id: annotation.id.to_string(),
            kind: annotation.kind(),
            page_number: annotation.page_number,
            position: annotation.position(),
            content: annotation.content().map(str::to_owned),
            points: annotation.points().map(<[PagePoint]>::to_vec),
            color: annotation.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rect_from_corners_any_direction() {
        let rect = PageRect::from_corners(PagePoint::new(50.0, 40.0), PagePoint::new(10.0, 10.0));
        assert_eq!(
            rect,
            PageRect {
                x: 10.0,
                y: 10.0,
                width: 40.0,
                height: 30.0
            }
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Annotation::comment(1, PagePoint::new(1.0, 1.0), "a");
        let b = Annotation::comment(1, PagePoint::new(1.0, 1.0), "a");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_drawing_position_is_placeholder() {
        let points = vec![PagePoint::new(3.0, 4.0), PagePoint::new(5.0, 6.0)];
        let drawing = Annotation::drawing(2, points.clone(), None);
        let position = drawing.position();
        assert_eq!((position.x, position.y), (0.0, 0.0));
        assert_eq!(drawing.points(), Some(points.as_slice()));
        assert_eq!(drawing.content(), None);
    }

    #[test]
    fn test_validate_rejects_degenerate_shapes() {
        let flat = Annotation::highlight(
            1,
            PageRect {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 0.0,
            },
            None,
        );
        assert!(flat.validate().is_err());
        assert!(Annotation::comment(1, PagePoint::new(0.0, 0.0), "").validate().is_err());
        let dot = Annotation::drawing(1, vec![PagePoint::new(0.0, 0.0)], None);
        assert!(dot.validate().is_err());
        let page_zero = Annotation::comment(0, PagePoint::new(0.0, 0.0), "x");
        assert!(page_zero.validate().is_err());
    }

    #[test]
    fn test_summary_truncates_long_comments() {
        let short = Annotation::comment(1, PagePoint::new(0.0, 0.0), "short note");
        assert_eq!(short.summary(), "Comment: short note");
        let long = Annotation::comment(1, PagePoint::new(0.0, 0.0), "abcdefghijklmnopqrstuvwxyz");
        assert_eq!(long.summary(), "Comment: abcdefghijklmnopqrst...");
        let drawing = Annotation::drawing(
            4,
            vec![PagePoint::new(0.0, 0.0), PagePoint::new(1.0, 1.0)],
            None,
        );
        assert_eq!(drawing.summary(), "Drawing on page 4");
    }

    #[test]
    fn test_serializes_to_flat_record() {
        let highlight = Annotation::highlight(
            3,
            PageRect {
                x: 10.0,
                y: 10.0,
                width: 40.0,
                height: 30.0,
            },
            Some("yellow".into()),
        );
        let value = serde_json::to_value(&highlight).unwrap();
        assert_eq!(value["id"], json!(highlight.id().to_string()));
        assert_eq!(value["type"], json!("highlight"));
        assert_eq!(value["pageNumber"], json!(3));
        assert_eq!(
            value["position"],
            json!({"x": 10.0, "y": 10.0, "width": 40.0, "height": 30.0})
        );
        assert_eq!(value["color"], json!("yellow"));
        assert!(value.get("content").is_none());
        assert!(value.get("points").is_none());
    }
}
