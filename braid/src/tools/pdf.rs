//! Word count of a local PDF file.

use std::path::Path;

use lopdf::Document;
use serde_json::json;

use super::{arg_str, object_schema, FnTool, ToolError};

pub const TOOL_COUNT_WORDS_IN_PDF: &str = "count_words_in_pdf";

/// Whitespace-separated words in the text of all pages of the PDF at `path`.
pub fn count_words_in_pdf(path: &Path) -> Result<usize, ToolError> {
    if !path.is_file() {
        return Err(ToolError::InvalidInput(format!(
            "PDF file does not exist: {}",
            path.display()
        )));
    }
    let doc = Document::load(path)
        .map_err(|e| ToolError::Execution(format!("cannot read PDF {}: {}", path.display(), e)))?;
    let mut words = 0;
    for page in doc.get_pages().keys() {
        let text = doc.extract_text(&[*page]).map_err(|e| {
            ToolError::Execution(format!("cannot extract text of page {}: {}", page, e))
        })?;
        words += text.split_whitespace().count();
    }
    Ok(words)
}

pub fn count_words_in_pdf_tool() -> FnTool {
    FnTool::new(
        TOOL_COUNT_WORDS_IN_PDF,
        "Count total words in a PDF file.",
        object_schema(json!({
            "file_path": {
                "type": "string",
                "description": "Absolute or relative path to the PDF file"
            }
        })),
        |args| {
            let path = arg_str(&args, "file_path")?;
            let word_count = count_words_in_pdf(Path::new(path))?;
            Ok(json!({"word_count": word_count}))
        },
    )
}
