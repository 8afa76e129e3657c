//! Pointer gesture interpretation.
//!
//! `GestureTracker` turns a pointer down / move / up sequence into candidate
//! geometry for the selected tool. It knows nothing about pages or the
//! annotation collection; the viewer decides what to do with the outcome.

use crate::annotation::{PagePoint, PageRect};
use crate::session::Tool;

/// Why a finished gesture produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// Pointer released without moving.
    NoSelection,
    /// Selection box not larger than the minimum on both axes.
    HighlightTooSmall,
    /// Drawing captured fewer than two points.
    DrawingTooShort,
    /// Comment text was empty or the comment was cancelled.
    EmptyComment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing was in progress.
    Idle,
    Highlight(PageRect),
    /// Comment anchor chosen; text still has to be collected.
    CommentAnchor(PagePoint),
    Drawing(Vec<PagePoint>),
    Discarded(DiscardReason),
}

/// In-progress gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Selecting {
        start: PagePoint,
        end: Option<PagePoint>,
    },
    Drawing {
        points: Vec<PagePoint>,
    },
}

#[derive(Debug, Clone)]
pub struct GestureTracker {
    state: GestureState,
    min_highlight_size: f64,
}

impl GestureTracker {
    pub fn new(min_highlight_size: f64) -> Self {
        Self {
            state: GestureState::Idle,
            min_highlight_size,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    pub fn pointer_down(&mut self, tool: Tool, point: PagePoint) {
        self.state = match tool {
            Tool::Cursor => GestureState::Idle,
            Tool::Highlight | Tool::Comment => GestureState::Selecting {
                start: point,
                end: None,
            },
            Tool::Drawing => GestureState::Drawing {
                points: vec![point],
            },
        };
        log::debug!("pointer down with {} tool: {:?}", tool, self.state);
    }

    pub fn pointer_move(&mut self, point: PagePoint) {
        match &mut self.state {
            GestureState::Idle => {}
            GestureState::Selecting { end, .. } => *end = Some(point),
            GestureState::Drawing { points } => points.push(point),
        }
    }

    /// Finishes the gesture as interpreted by `tool` and resets to idle
    /// whatever the outcome.
    pub fn pointer_up(&mut self, tool: Tool) -> GestureOutcome {
        let outcome = match (tool, std::mem::take(&mut self.state)) {
            (_, GestureState::Idle) => GestureOutcome::Idle,
            (Tool::Highlight, GestureState::Selecting { start, end }) => match end {
                Some(end) => {
                    let rect = PageRect::from_corners(start, end);
                    let min = self.min_highlight_size;
                    if rect.width > min && rect.height > min {
                        GestureOutcome::Highlight(rect)
                    } else {
                        GestureOutcome::Discarded(DiscardReason::HighlightTooSmall)
                    }
                }
                None => GestureOutcome::Discarded(DiscardReason::NoSelection),
            },
            (Tool::Comment, GestureState::Selecting { start, .. }) => {
                GestureOutcome::CommentAnchor(start)
            }
            (Tool::Drawing, GestureState::Drawing { points }) => {
                if points.len() < 2 {
                    GestureOutcome::Discarded(DiscardReason::DrawingTooShort)
                } else {
                    GestureOutcome::Drawing(points)
                }
            }
            // tool switched mid-gesture
            _ => GestureOutcome::Idle,
        };
        log::debug!("pointer up with {} tool: {:?}", tool, outcome);
        outcome
    }

    /// Drops any in-progress gesture without producing an outcome.
    pub fn reset(&mut self) {
        if self.is_active() {
            log::debug!("gesture reset: {:?}", self.state);
        }
        self.state = GestureState::Idle;
    }

    /// Rectangle of the current selection, once it has an end point.
    pub fn selection_rect(&self) -> Option<PageRect> {
        match &self.state {
            GestureState::Selecting {
                start,
                end: Some(end),
            } => Some(PageRect::from_corners(*start, *end)),
            _ => None,
        }
    }

    /// Points captured so far by a drawing gesture.
    pub fn drawing_points(&self) -> Option<&[PagePoint]> {
        match &self.state {
            GestureState::Drawing { points } => Some(points),
            _ => None,
        }
    }
}
