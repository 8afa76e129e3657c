//! Viewer controller.
//!
//! `Viewer` owns the session, the gesture tracker and the options. The JS
//! surface forwards pointer and toolbar events here and redraws from
//! `overlay()` whenever an action says something changed. Nothing in this
//! module touches the browser, so the whole interaction model runs in
//! native tests.

use crate::annotation::{Annotation, PagePoint};
use crate::file_utils::validate_upload;
use crate::gesture::{DiscardReason, GestureOutcome, GestureTracker};
use crate::overlay::{OverlayShape, render_annotations, render_preview};
use crate::schema::{ViewerError, ViewerOptions};
use crate::session::{SessionState, Tool};
use crate::transform::{ScreenPoint, Transform};
use serde::Serialize;

/// Result of feeding an input event to the viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ViewerAction {
    None,
    /// The live preview changed; redraw the overlay.
    PreviewChanged,
    AnnotationAdded { annotation: Annotation },
    /// Open a text box at `screen` and answer with `commit_comment` or
    /// `cancel_comment`.
    CommentRequested { anchor: PagePoint, screen: ScreenPoint },
    Discarded { reason: DiscardReason },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingComment {
    page: u32,
    anchor: PagePoint,
}

#[derive(Debug, Clone)]
pub struct Viewer {
    session: SessionState,
    gesture: GestureTracker,
    pending_comment: Option<PendingComment>,
    options: ViewerOptions,
}

impl Viewer {
    pub fn new(options: ViewerOptions) -> Self {
        Self {
            session: SessionState::new(&options),
            gesture: GestureTracker::new(options.min_highlight_size),
            pending_comment: None,
            options,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.session.scale())
    }

    /// Validates an upload and starts a new session for it.
    ///
    /// Returns the generation the eventual load result must carry.
    pub fn open_file(
        &mut self,
        name: &str,
        media_type: &str,
        size: u64,
        head: &[u8],
    ) -> Result<u64, ViewerError> {
        let file = validate_upload(name, media_type, size, head, self.options.max_upload_bytes)?;
        self.drop_interaction();
        Ok(self.session.set_file(Some(file)))
    }

    pub fn close_file(&mut self) {
        self.drop_interaction();
        self.session.set_file(None);
    }

    pub fn document_loaded(
        &mut self,
        generation: u64,
        page_count: u32,
    ) -> Result<bool, ViewerError> {
        self.session.document_loaded(generation, page_count)
    }

    /// Applies a load failure for the current file. Stale failures are
    /// ignored.
    pub fn document_load_failed(&mut self, generation: u64, message: &str) -> bool {
        let applied = self.session.document_load_failed(generation);
        if applied {
            log::error!("Error loading PDF: {}", message);
            self.drop_interaction();
        }
        applied
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.session.selected_tool() {
            self.drop_interaction();
        }
        self.session.set_selected_tool(tool);
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), ViewerError> {
        self.session.set_scale(scale)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.session.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.session.zoom_out()
    }

    pub fn rotate_by(&mut self, delta: i32) -> Result<u16, ViewerError> {
        self.session.rotate_by(delta)
    }

    pub fn go_to_page(&mut self, page: u32) -> Result<(), ViewerError> {
        self.session.set_current_page(page)?;
        self.drop_interaction();
        Ok(())
    }

    pub fn change_page(&mut self, delta: i64) -> bool {
        let moved = self.session.change_page(delta);
        if moved {
            self.drop_interaction();
        }
        moved
    }

    /// Keyboard navigation: arrow keys flip pages. Returns whether the key
    /// changed anything.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "ArrowLeft" => self.change_page(-1),
            "ArrowRight" => self.change_page(1),
            _ => false,
        }
    }

    /// Pointer pressed at surface coordinates `(x, y)`.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> ViewerAction {
        if !self.session.is_loaded() {
            return ViewerAction::None;
        }
        if self.pending_comment.take().is_some() {
            log::debug!("pending comment cancelled by new pointer press");
        }
        let tool = self.session.selected_tool();
        let point = self.transform().to_page(x, y);
        self.gesture.pointer_down(tool, point);
        if self.gesture.is_active() {
            ViewerAction::PreviewChanged
        } else {
            ViewerAction::None
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> ViewerAction {
        if !self.gesture.is_active() {
            return ViewerAction::None;
        }
        let point = self.transform().to_page(x, y);
        self.gesture.pointer_move(point);
        match self.session.selected_tool() {
            Tool::Highlight | Tool::Drawing => ViewerAction::PreviewChanged,
            Tool::Cursor | Tool::Comment => ViewerAction::None,
        }
    }

    /// Pointer released: commits, opens a comment or discards.
    pub fn pointer_up(&mut self) -> Result<ViewerAction, ViewerError> {
        let page = self.session.current_page();
        match self.gesture.pointer_up(self.session.selected_tool()) {
            GestureOutcome::Idle => Ok(ViewerAction::None),
            GestureOutcome::Highlight(rect) => {
                let color = self.options.highlight_color.clone();
                self.commit(Annotation::highlight(page, rect, color))
            }
            GestureOutcome::Drawing(points) => {
                let color = self.options.drawing_color.clone();
                self.commit(Annotation::drawing(page, points, color))
            }
            GestureOutcome::CommentAnchor(anchor) => Ok(self.begin_comment(anchor)),
            GestureOutcome::Discarded(reason) => {
                log::debug!("gesture discarded: {:?}", reason);
                Ok(ViewerAction::Discarded { reason })
            }
        }
    }

    /// Pointer left the surface; handled like a release.
    pub fn pointer_leave(&mut self) -> Result<ViewerAction, ViewerError> {
        self.pointer_up()
    }

    /// Opens a comment anchored at `anchor` on the current page.
    pub fn begin_comment(&mut self, anchor: PagePoint) -> ViewerAction {
        self.pending_comment = Some(PendingComment {
            page: self.session.current_page(),
            anchor,
        });
        ViewerAction::CommentRequested {
            anchor,
            screen: self.transform().to_screen(anchor),
        }
    }

    pub fn pending_comment(&self) -> Option<PagePoint> {
        self.pending_comment.map(|p| p.anchor)
    }

    /// Finishes the open comment. Empty text discards it.
    pub fn commit_comment(&mut self, text: &str) -> Result<ViewerAction, ViewerError> {
        let pending = self
            .pending_comment
            .take()
            .ok_or(ViewerError::NoPendingComment)?;
        if text.is_empty() {
            return Ok(ViewerAction::Discarded {
                reason: DiscardReason::EmptyComment,
            });
        }
        self.commit(Annotation::comment(pending.page, pending.anchor, text))
    }

    pub fn cancel_comment(&mut self) -> Result<ViewerAction, ViewerError> {
        self.pending_comment
            .take()
            .ok_or(ViewerError::NoPendingComment)?;
        Ok(ViewerAction::Discarded {
            reason: DiscardReason::EmptyComment,
        })
    }

    /// Shapes for the current page: committed annotations in insertion
    /// order, then the live preview if a gesture is in progress.
    pub fn overlay(&self) -> Vec<OverlayShape> {
        let transform = self.transform();
        let page = self.session.current_page();
        let mut shapes = render_annotations(self.session.annotations_on_page(page), &transform);
        if let Some(preview) = render_preview(
            &self.gesture,
            self.session.selected_tool(),
            &transform,
            self.options.highlight_color.as_deref(),
            self.options.drawing_color.as_deref(),
        ) {
            shapes.push(preview);
        }
        shapes
    }

    fn commit(&mut self, annotation: Annotation) -> Result<ViewerAction, ViewerError> {
        self.session.add_annotation(annotation.clone())?;
        Ok(ViewerAction::AnnotationAdded { annotation })
    }

    fn drop_interaction(&mut self) {
        self.gesture.reset();
        self.pending_comment = None;
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerOptions::default())
    }
}
