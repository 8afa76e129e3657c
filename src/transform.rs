//! Page-space / screen-space conversion.
//!
//! Screen coordinates are CSS pixels relative to the top-left of the page
//! surface. The law is `screen = page * scale` for positions and extents.
//! Rotation is applied to the page bitmap by pdf.js and is not applied to
//! overlay geometry, so overlays drift from rotated content.

use crate::annotation::{PagePoint, PageRect};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scale-only transform between page and screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f64,
}

impl Transform {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_screen(&self, point: PagePoint) -> ScreenPoint {
        ScreenPoint {
            x: point.x * self.scale,
            y: point.y * self.scale,
        }
    }

    pub fn rect_to_screen(&self, rect: PageRect) -> ScreenRect {
        ScreenRect {
            x: rect.x * self.scale,
            y: rect.y * self.scale,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }

    /// Inverse transform used for pointer input.
    pub fn to_page(&self, x: f64, y: f64) -> PagePoint {
        PagePoint::new(x / self.scale, y / self.scale)
    }

    /// SVG path data for a polyline: a move-to on the first point and a
    /// line-to for every following point, in screen space.
    pub fn path_data(&self, points: &[PagePoint]) -> String {
        let mut path = String::new();
        for (index, point) in points.iter().enumerate() {
            let screen = self.to_screen(*point);
            if index == 0 {
                path.push_str(&format!("M {} {}", screen.x, screen.y));
            } else {
                path.push_str(&format!(" L {} {}", screen.x, screen.y));
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_scales_position_and_extent() {
        let rect = PageRect {
            x: 12.0,
            y: 7.5,
            width: 40.0,
            height: 30.0,
        };
        for scale in [0.5, 0.8, 1.0, 1.7, 2.5] {
            let screen = Transform::new(scale).rect_to_screen(rect);
            assert_eq!(
                screen,
                ScreenRect {
                    x: 12.0 * scale,
                    y: 7.5 * scale,
                    width: 40.0 * scale,
                    height: 30.0 * scale,
                }
            );
        }
    }

    #[test]
    fn test_to_page_inverts_scale() {
        let transform = Transform::new(2.0);
        assert_eq!(transform.to_page(20.0, 80.0), PagePoint::new(10.0, 40.0));
    }

    #[test]
    fn test_path_data_polyline() {
        let points = [
            PagePoint::new(0.0, 0.0),
            PagePoint::new(5.0, 5.0),
            PagePoint::new(10.0, 0.0),
        ];
        assert_eq!(
            Transform::new(2.0).path_data(&points),
            "M 0 0 L 10 10 L 20 0"
        );
        assert_eq!(
            Transform::new(0.5).path_data(&points[..2]),
            "M 0 0 L 2.5 2.5"
        );
    }

    #[test]
    fn test_path_data_empty() {
        assert_eq!(Transform::new(1.0).path_data(&[]), "");
    }
}
