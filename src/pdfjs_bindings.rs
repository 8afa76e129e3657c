//! JavaScript bindings for PDF.js
//!
//! Parsing and rasterization stay in pdf.js. This crate only needs the page
//! count of a freshly opened document; page bitmaps and text layers are
//! rendered by the JS side with the current scale and rotation.

use crate::schema::ViewerError;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/pdfjs_bridge.js")]
extern "C" {
    /// Open a PDF with PDF.js.
    /// Resolves to a JSON string `{"page_count": number}`; rejects with the
    /// PDF.js error when the bytes cannot be parsed.
    #[wasm_bindgen(catch)]
    pub async fn load_pdf_document_js(bytes: &[u8]) -> Result<JsValue, JsValue>;
}

#[derive(Deserialize)]
struct LoadResult {
    page_count: u32,
}

/// Extracts the page count from the bridge's JSON reply.
pub fn parse_load_result(json: &str) -> Result<u32, ViewerError> {
    let result: LoadResult =
        serde_json::from_str(json).map_err(|e| ViewerError::LoadFailed(e.to_string()))?;
    if result.page_count == 0 {
        return Err(ViewerError::LoadFailed("document has no pages".into()));
    }
    Ok(result.page_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_load_result() {
        assert_eq!(parse_load_result(r#"{"page_count": 3}"#), Ok(3));
        assert!(parse_load_result(r#"{"page_count": 0}"#).is_err());
        assert!(parse_load_result("null").is_err());
    }
}
