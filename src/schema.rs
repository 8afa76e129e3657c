//! Shared error and configuration types for the annotation viewer.
//!
//! This module defines the error enum returned by every fallible viewer
//! operation and the options structure that JavaScript passes in as JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while driving the viewer.
///
/// Every mutator on the session validates its input and reports one of
/// these instead of storing an out-of-range value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewerError {
    /// Requested zoom factor is outside the configured range.
    #[error("Scale {value} outside allowed range [{min}, {max}]")]
    ScaleOutOfRange { value: f64, min: f64, max: f64 },
    /// Requested page does not exist in the open document.
    #[error("Page {page} outside document range [1, {num_pages}]")]
    PageOutOfRange { page: u32, num_pages: u32 },
    /// Rotation must be a multiple of 90 degrees.
    #[error("Rotation {0} is not a multiple of 90 degrees")]
    InvalidRotation(i32),
    /// Tool name did not match any known tool.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// Annotation shape does not satisfy its type's requirements.
    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),
    /// `commit_comment` or `cancel_comment` without an open comment.
    #[error("No comment is awaiting text")]
    NoPendingComment,
    /// Upload rejected because it is not a PDF.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    /// Upload rejected because it exceeds the size limit.
    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },
    /// Options JSON could not be parsed or holds inconsistent values.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    /// The rendering engine could not open the document.
    #[error("Failed to load PDF: {0}")]
    LoadFailed(String),
}

/// Configuration options for the viewer.
///
/// All fields are optional in JSON; missing fields take the defaults
/// listed on each field.
///
/// # Examples
///
/// Defaults:
/// ```json
/// {}
/// ```
///
/// Wider zoom range and blue drawings:
/// ```json
/// { "max_scale": 4.0, "drawing_color": "blue" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Smallest zoom factor. Defaults to 0.5.
    pub min_scale: f64,
    /// Largest zoom factor. Defaults to 2.5.
    pub max_scale: f64,
    /// Zoom factor of a freshly created viewer. Defaults to 1.0.
    pub initial_scale: f64,
    /// Amount added or removed by zoom in/out. Defaults to 0.1.
    pub zoom_step: f64,
    /// Highlight boxes must exceed this size on both axes, in page units.
    /// Defaults to 5.0.
    pub min_highlight_size: f64,
    /// Upload size limit in bytes. Defaults to 50 MiB.
    pub max_upload_bytes: u64,
    /// Display color stored on new highlights.
    pub highlight_color: Option<String>,
    /// Display color stored on new drawings.
    pub drawing_color: Option<String>,
    /// Console log level: "error", "warn", "info", "debug" or "trace".
    pub log_level: String,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.5,
            initial_scale: 1.0,
            zoom_step: 0.1,
            min_highlight_size: 5.0,
            max_upload_bytes: 50 * 1024 * 1024,
            highlight_color: Some("yellow".into()),
            drawing_color: Some("red".into()),
            log_level: "info".into(),
        }
    }
}

impl ViewerOptions {
    /// Parses options from JSON and validates them.
    ///
    /// `None` yields the defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, ViewerError> {
        let options: ViewerOptions = match json {
            Some(s) => serde_json::from_str(s)
                .map_err(|e| ViewerError::InvalidOptions(e.to_string()))?,
            None => ViewerOptions::default(),
        };
        options.validate()?;
        Ok(options)
    }

    /// Checks that the numeric options are consistent with each other.
    pub fn validate(&self) -> Result<(), ViewerError> {
        let scales = [self.min_scale, self.max_scale, self.initial_scale];
        if scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ViewerError::InvalidOptions(
                "scales must be positive and finite".into(),
            ));
        }
        if self.min_scale > self.max_scale {
            return Err(ViewerError::InvalidOptions(format!(
                "min_scale {} greater than max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.initial_scale) {
            return Err(ViewerError::InvalidOptions(format!(
                "initial_scale {} outside [{}, {}]",
                self.initial_scale, self.min_scale, self.max_scale
            )));
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 {
            return Err(ViewerError::InvalidOptions("zoom_step must be positive".into()));
        }
        if !self.min_highlight_size.is_finite() || self.min_highlight_size < 0.0 {
            return Err(ViewerError::InvalidOptions(
                "min_highlight_size must be non-negative".into(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ViewerError::InvalidOptions(
                "max_upload_bytes must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Log level filter parsed from `log_level`, falling back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
