//! Document session state.
//!
//! `SessionState` is the single owner of everything the toolbar, sidebar and
//! overlay read: the open file, page count, current page, zoom, rotation,
//! selected tool and the annotation collection. Every mutator validates its
//! input and leaves the state untouched on error.

use crate::annotation::Annotation;
use crate::schema::{ViewerError, ViewerOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tool that decides how pointer gestures are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Cursor,
    Highlight,
    Comment,
    Drawing,
}

impl FromStr for Tool {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cursor" => Ok(Tool::Cursor),
            "highlight" => Ok(Tool::Highlight),
            "comment" => Ok(Tool::Comment),
            "drawing" => Ok(Tool::Drawing),
            other => Err(ViewerError::UnknownTool(other.to_string())),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Cursor => "cursor",
            Tool::Highlight => "highlight",
            Tool::Comment => "comment",
            Tool::Drawing => "drawing",
        };
        f.write_str(name)
    }
}

/// Metadata of the file handed over by the upload widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
}

/// Read-only copy of the session fields for UI collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub file: Option<DocumentFile>,
    pub generation: u64,
    pub num_pages: u32,
    pub current_page: u32,
    pub scale: f64,
    pub zoom_percent: u32,
    pub rotation: u16,
    pub selected_tool: Tool,
    pub is_loaded: bool,
    pub annotation_count: usize,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    file: Option<DocumentFile>,
    generation: u64,
    num_pages: u32,
    is_loaded: bool,
    current_page: u32,
    scale: f64,
    rotation: u16,
    selected_tool: Tool,
    annotations: Vec<Annotation>,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
}

impl SessionState {
    pub fn new(options: &ViewerOptions) -> Self {
        Self {
            file: None,
            generation: 0,
            num_pages: 0,
            is_loaded: false,
            current_page: 1,
            scale: options.initial_scale,
            rotation: 0,
            selected_tool: Tool::default(),
            annotations: Vec::new(),
            min_scale: options.min_scale,
            max_scale: options.max_scale,
            zoom_step: options.zoom_step,
        }
    }

    pub fn file(&self) -> Option<&DocumentFile> {
        self.file.as_ref()
    }

    /// Incremented on every `set_file`; tags in-flight document loads.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn selected_tool(&self) -> Tool {
        self.selected_tool
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Starts a new session for `file`, or closes the document with `None`.
    ///
    /// Annotations, page count and load state are discarded. Zoom, rotation
    /// and the selected tool carry over.
    pub fn set_file(&mut self, file: Option<DocumentFile>) -> u64 {
        self.generation += 1;
        match &file {
            Some(f) => log::info!("Opening {} ({} bytes)", f.name, f.size),
            None => log::info!("Closing document"),
        }
        if !self.annotations.is_empty() {
            log::debug!("Discarding {} annotations", self.annotations.len());
        }
        self.file = file;
        self.current_page = 1;
        self.num_pages = 0;
        self.is_loaded = false;
        self.annotations.clear();
        self.generation
    }

    pub fn set_scale(&mut self, value: f64) -> Result<(), ViewerError> {
        if !value.is_finite() || value < self.min_scale || value > self.max_scale {
            return Err(ViewerError::ScaleOutOfRange {
                value,
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        self.scale = value;
        Ok(())
    }

    /// Adds `delta` to the scale, clamped into the allowed range.
    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        let target = self.scale + delta;
        if target.is_finite() {
            self.scale = target.clamp(self.min_scale, self.max_scale);
        }
        self.scale
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom_by(self.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom_by(-self.zoom_step)
    }

    /// Stores any multiple of 90 degrees, normalized into `[0, 360)`.
    pub fn set_rotation(&mut self, value: i32) -> Result<(), ViewerError> {
        if value % 90 != 0 {
            return Err(ViewerError::InvalidRotation(value));
        }
        self.rotation = value.rem_euclid(360) as u16;
        Ok(())
    }

    pub fn rotate_by(&mut self, delta: i32) -> Result<u16, ViewerError> {
        if delta % 90 != 0 {
            return Err(ViewerError::InvalidRotation(delta));
        }
        self.set_rotation(i32::from(self.rotation) + delta.rem_euclid(360))?;
        Ok(self.rotation)
    }

    pub fn rotate_clockwise(&mut self) -> u16 {
        self.rotation = (self.rotation + 90) % 360;
        self.rotation
    }

    pub fn rotate_counter_clockwise(&mut self) -> u16 {
        self.rotation = (self.rotation + 270) % 360;
        self.rotation
    }

    pub fn set_current_page(&mut self, page: u32) -> Result<(), ViewerError> {
        if page < 1 || page > self.num_pages {
            return Err(ViewerError::PageOutOfRange {
                page,
                num_pages: self.num_pages,
            });
        }
        self.current_page = page;
        Ok(())
    }

    /// Moves by `delta` pages. Returns `false` without changing anything
    /// when the target page does not exist.
    pub fn change_page(&mut self, delta: i64) -> bool {
        let target = i64::from(self.current_page) + delta;
        if target < 1 || target > i64::from(self.num_pages) {
            return false;
        }
        self.current_page = target as u32;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.change_page(1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.change_page(-1)
    }

    pub fn set_selected_tool(&mut self, tool: Tool) {
        self.selected_tool = tool;
    }

    /// Replaces the page count, pulling the current page back into range.
    pub fn set_num_pages(&mut self, num_pages: u32) {
        self.num_pages = num_pages;
        self.current_page = self.current_page.clamp(1, num_pages.max(1));
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.is_loaded = loaded;
    }

    /// Applies a successful load result. Results for an older file are
    /// ignored and reported as `Ok(false)`.
    pub fn document_loaded(
        &mut self,
        generation: u64,
        page_count: u32,
    ) -> Result<bool, ViewerError> {
        if generation != self.generation {
            log::warn!(
                "Ignoring load result for generation {} (current {})",
                generation,
                self.generation
            );
            return Ok(false);
        }
        if page_count == 0 {
            self.document_load_failed(generation);
            return Err(ViewerError::LoadFailed("document has no pages".into()));
        }
        self.set_num_pages(page_count);
        self.is_loaded = true;
        log::info!("Document loaded with {} pages", page_count);
        Ok(true)
    }

    /// Marks the session not loaded. File and annotations are kept.
    pub fn document_load_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            log::warn!("Ignoring load failure for stale generation {}", generation);
            return false;
        }
        self.is_loaded = false;
        self.num_pages = 0;
        self.current_page = 1;
        true
    }

    /// Validates and appends. Existing entries are never touched.
    pub fn add_annotation(&mut self, annotation: Annotation) -> Result<(), ViewerError> {
        annotation.validate()?;
        if annotation.page_number() > self.num_pages {
            return Err(ViewerError::PageOutOfRange {
                page: annotation.page_number(),
                num_pages: self.num_pages,
            });
        }
        log::info!(
            "Added {:?} annotation {} on page {}",
            annotation.kind(),
            annotation.id(),
            annotation.page_number()
        );
        self.annotations.push(annotation);
        Ok(())
    }

    pub fn annotations_on_page(&self, page: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |a| a.page_number() == page)
    }

    pub fn annotation_count_on_page(&self, page: u32) -> usize {
        self.annotations_on_page(page).count()
    }

    /// Annotations grouped by page, pages ascending, insertion order within
    /// a page.
    pub fn annotations_by_page(&self) -> BTreeMap<u32, Vec<&Annotation>> {
        let mut grouped: BTreeMap<u32, Vec<&Annotation>> = BTreeMap::new();
        for annotation in &self.annotations {
            grouped
                .entry(annotation.page_number())
                .or_default()
                .push(annotation);
        }
        grouped
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            file: self.file.clone(),
            generation: self.generation,
            num_pages: self.num_pages,
            current_page: self.current_page,
            scale: self.scale,
            zoom_percent: self.zoom_percent(),
            rotation: self.rotation,
            selected_tool: self.selected_tool,
            is_loaded: self.is_loaded,
            annotation_count: self.annotations.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{PagePoint, PageRect};

    fn pdf(name: &str) -> DocumentFile {
        DocumentFile {
            name: name.into(),
            media_type: "application/pdf".into(),
            size: 1024,
        }
    }

    fn loaded(pages: u32) -> SessionState {
        let mut session = SessionState::new(&ViewerOptions::default());
        let generation = session.set_file(Some(pdf("a.pdf")));
        session.document_loaded(generation, pages).unwrap();
        session
    }

    fn note(page: u32, text: &str) -> Annotation {
        Annotation::comment(page, PagePoint::new(1.0, 2.0), text)
    }

    #[test]
    fn test_three_page_navigation() {
        let mut session = loaded(3);
        assert_eq!(session.num_pages(), 3);
        assert_eq!(session.current_page(), 1);
        assert!(session.next_page());
        assert!(session.next_page());
        assert_eq!(session.current_page(), 3);
        assert!(!session.next_page());
        assert_eq!(session.current_page(), 3);
        assert!(session.previous_page());
        assert_eq!(session.current_page(), 2);
    }

    #[test]
    fn test_set_current_page_bounds() {
        let mut session = loaded(3);
        assert!(session.set_current_page(0).is_err());
        assert_eq!(
            session.set_current_page(4),
            Err(ViewerError::PageOutOfRange {
                page: 4,
                num_pages: 3
            })
        );
        session.set_current_page(2).unwrap();
        assert_eq!(session.current_page(), 2);
    }

    #[test]
    fn test_rotation_cycles() {
        let mut session = loaded(1);
        for _ in 0..4 {
            session.rotate_by(90).unwrap();
        }
        assert_eq!(session.rotation(), 0);
        assert_eq!(session.rotate_by(-90).unwrap(), 270);
        assert_eq!(session.rotate_clockwise(), 0);
        assert_eq!(session.rotate_counter_clockwise(), 270);
        session.set_rotation(-450).unwrap();
        assert_eq!(session.rotation(), 270);
        assert_eq!(session.set_rotation(45), Err(ViewerError::InvalidRotation(45)));
        assert_eq!(session.rotation(), 270);
    }

    #[test]
    fn test_rotate_by_extreme_delta() {
        let mut session = loaded(1);
        session.rotate_by(90).unwrap();
        assert_eq!(
            session.rotate_by(i32::MAX - 7),
            Err(ViewerError::InvalidRotation(i32::MAX - 7))
        );
        assert_eq!(session.rotation(), 90);
        // 2147483610 is 90 modulo 360.
        assert_eq!(session.rotate_by(2_147_483_610).unwrap(), 180);
        // -2147483610 is 270 modulo 360.
        assert_eq!(session.rotate_by(-2_147_483_610).unwrap(), 90);
    }

    #[test]
    fn test_scale_validation_and_clamped_zoom() {
        let mut session = loaded(1);
        assert!(session.set_scale(3.0).is_err());
        assert!(session.set_scale(0.4).is_err());
        assert!(session.set_scale(f64::NAN).is_err());
        assert_eq!(session.scale(), 1.0);
        session.set_scale(2.45).unwrap();
        assert_eq!(session.zoom_in(), 2.5);
        assert_eq!(session.zoom_in(), 2.5);
        session.set_scale(0.55).unwrap();
        assert_eq!(session.zoom_out(), 0.5);
        assert_eq!(session.zoom_percent(), 50);
    }

    #[test]
    fn test_add_annotation_is_append_only() {
        let mut session = loaded(5);
        let first = note(1, "one");
        session.add_annotation(first.clone()).unwrap();
        let mut expected = vec![first];
        for i in 0..10 {
            let next = note(i % 5 + 1, "more");
            session.add_annotation(next.clone()).unwrap();
            expected.push(next);
            assert_eq!(session.annotations(), expected.as_slice());
        }
    }

    #[test]
    fn test_add_annotation_rejects_invalid() {
        let mut session = loaded(2);
        assert!(session.add_annotation(note(3, "off the end")).is_err());
        let tiny = Annotation::highlight(
            1,
            PageRect {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            },
            None,
        );
        assert!(session.add_annotation(tiny).is_err());
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_new_file_resets_session() {
        let mut session = loaded(4);
        session.set_current_page(3).unwrap();
        session.add_annotation(note(3, "x")).unwrap();
        session.set_scale(2.0).unwrap();
        session.set_selected_tool(Tool::Drawing);

        let generation = session.set_file(Some(pdf("b.pdf")));
        assert_eq!(session.current_page(), 1);
        assert!(session.annotations().is_empty());
        assert!(!session.is_loaded());
        assert_eq!(session.num_pages(), 0);
        assert_eq!(session.scale(), 2.0);
        assert_eq!(session.selected_tool(), Tool::Drawing);
        assert_eq!(session.file().map(|f| f.name.as_str()), Some("b.pdf"));
        assert_eq!(generation, session.generation());
    }

    #[test]
    fn test_stale_load_result_ignored() {
        let mut session = SessionState::new(&ViewerOptions::default());
        let old = session.set_file(Some(pdf("a.pdf")));
        let new = session.set_file(Some(pdf("b.pdf")));
        assert_eq!(session.document_loaded(old, 9), Ok(false));
        assert!(!session.is_loaded());
        assert!(!session.document_load_failed(old));
        assert_eq!(session.document_loaded(new, 2), Ok(true));
        assert!(session.is_loaded());
        assert_eq!(session.num_pages(), 2);
    }

    #[test]
    fn test_load_failure_keeps_file_and_annotations() {
        let mut session = loaded(2);
        session.add_annotation(note(2, "keep")).unwrap();
        assert!(session.document_load_failed(session.generation()));
        assert!(!session.is_loaded());
        assert_eq!(session.num_pages(), 0);
        assert_eq!(session.annotations().len(), 1);
        assert!(session.file().is_some());
    }

    #[test]
    fn test_zero_page_document_is_a_failure() {
        let mut session = SessionState::new(&ViewerOptions::default());
        let generation = session.set_file(Some(pdf("empty.pdf")));
        assert!(matches!(
            session.document_loaded(generation, 0),
            Err(ViewerError::LoadFailed(_))
        ));
        assert!(!session.is_loaded());
    }

    #[test]
    fn test_grouping_by_page() {
        let mut session = loaded(3);
        session.add_annotation(note(3, "c")).unwrap();
        session.add_annotation(note(1, "a")).unwrap();
        session.add_annotation(note(3, "d")).unwrap();
        let grouped = session.annotations_by_page();
        let pages: Vec<u32> = grouped.keys().copied().collect();
        assert_eq!(pages, vec![1, 3]);
        let on_three: Vec<&str> = grouped[&3].iter().filter_map(|a| a.content()).collect();
        assert_eq!(on_three, vec!["c", "d"]);
        assert_eq!(session.annotation_count_on_page(3), 2);
        assert_eq!(session.annotation_count_on_page(2), 0);
    }

    #[test]
    fn test_set_num_pages_clamps_current_page() {
        let mut session = loaded(5);
        session.set_current_page(5).unwrap();
        session.set_num_pages(2);
        assert_eq!(session.current_page(), 2);
    }

    #[test]
    fn test_tool_parsing() {
        assert_eq!("drawing".parse::<Tool>(), Ok(Tool::Drawing));
        assert_eq!(
            "eraser".parse::<Tool>(),
            Err(ViewerError::UnknownTool("eraser".into()))
        );
        assert_eq!(Tool::Highlight.to_string(), "highlight");
    }
}
