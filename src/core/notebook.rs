//! Content transformers
//!
//! Some file types are rewritten into plain text before they enter the digest.
//! Transformers are looked up by file extension; the default registry knows
//! how to flatten Jupyter notebooks into a Python-like script.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Failure inside a transformer
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in notebook: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Converts a structured document into plain text
pub trait ContentTransformer: Send + Sync {
    /// File extension (without the dot) this transformer handles
    fn extension(&self) -> &str;

    /// Short name used in error placeholders ("notebook")
    fn label(&self) -> &str;

    /// Produce the plain-text rendition of the file at `path`
    fn transform(&self, path: &Path) -> Result<String, TransformError>;
}

/// Registry of transformers keyed by file extension
pub struct ContentTransformers {
    transformers: Vec<Box<dyn ContentTransformer>>,
}

impl ContentTransformers {
    /// A registry without any transformer
    pub fn empty() -> Self {
        Self {
            transformers: Vec::new(),
        }
    }

    /// Register a transformer; later registrations win for the same extension
    pub fn register(mut self, transformer: impl ContentTransformer + 'static) -> Self {
        self.transformers.insert(0, Box::new(transformer));
        self
    }

    /// Find the transformer responsible for `path`, if any
    pub fn for_path(&self, path: &Path) -> Option<&dyn ContentTransformer> {
        let ext = path.extension()?.to_str()?;
        self.transformers
            .iter()
            .find(|t| t.extension() == ext)
            .map(|t| t.as_ref())
    }
}

impl Default for ContentTransformers {
    fn default() -> Self {
        Self::empty().register(NotebookTransformer::default())
    }
}

static DEFAULT_TRANSFORMERS: Lazy<ContentTransformers> = Lazy::new(ContentTransformers::default);

/// The process-wide default registry
pub fn default_transformers() -> &'static ContentTransformers {
    &DEFAULT_TRANSFORMERS
}

const NOTEBOOK_HEADER: &str = "# Jupyter notebook converted to Python script.";

/// Flattens `.ipynb` documents
#[derive(Debug, Clone, Copy)]
pub struct NotebookTransformer {
    /// Append code cell outputs as comments
    pub include_output: bool,
}

impl Default for NotebookTransformer {
    fn default() -> Self {
        Self {
            include_output: true,
        }
    }
}

impl ContentTransformer for NotebookTransformer {
    fn extension(&self) -> &str {
        "ipynb"
    }

    fn label(&self) -> &str {
        "notebook"
    }

    fn transform(&self, path: &Path) -> Result<String, TransformError> {
        let raw = fs::read_to_string(path)?;
        let notebook: Value = serde_json::from_str(&raw)?;
        self.convert(&notebook, path)
    }
}

impl NotebookTransformer {
    fn convert(&self, notebook: &Value, path: &Path) -> Result<String, TransformError> {
        let cells = collect_cells(notebook, path)?;

        let mut parts = vec![NOTEBOOK_HEADER.to_string()];
        for cell in cells {
            if let Some(text) = self.convert_cell(cell)? {
                parts.push(text);
            }
        }

        Ok(parts.join("\n\n") + "\n")
    }

    fn convert_cell(&self, cell: &Value) -> Result<Option<String>, TransformError> {
        let cell_type = cell
            .get("cell_type")
            .and_then(Value::as_str)
            .ok_or_else(|| TransformError::Invalid("Cell without cell_type".to_string()))?;

        let source = join_text(cell.get("source"));
        if source.is_empty() {
            return Ok(None);
        }

        match cell_type {
            "markdown" | "raw" => Ok(Some(format!("\"\"\"\n{}\n\"\"\"", source))),
            "code" => {
                let mut text = source;
                let outputs = cell
                    .get("outputs")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                if self.include_output && !outputs.is_empty() {
                    let mut lines = Vec::new();
                    for output in outputs {
                        lines.extend(output_lines(output)?);
                    }
                    text.push_str("\n# Output:");
                    for line in lines {
                        text.push_str("\n#   ");
                        text.push_str(&line);
                    }
                }
                Ok(Some(text))
            }
            other => Err(TransformError::Invalid(format!(
                "Unknown cell type: {}",
                other
            ))),
        }
    }
}

fn collect_cells<'a>(notebook: &'a Value, path: &Path) -> Result<Vec<&'a Value>, TransformError> {
    if let Some(worksheets) = notebook
        .get("worksheets")
        .and_then(Value::as_array)
        .filter(|w| !w.is_empty())
    {
        log::warn!(
            "{}: notebook uses the deprecated worksheets layout",
            path.display()
        );
        if worksheets.len() > 1 {
            log::warn!(
                "{}: combining {} worksheets into a single script",
                path.display(),
                worksheets.len()
            );
        }
        let mut cells = Vec::new();
        for sheet in worksheets {
            if let Some(sheet_cells) = sheet.get("cells").and_then(Value::as_array) {
                cells.extend(sheet_cells.iter());
            }
        }
        return Ok(cells);
    }

    notebook
        .get("cells")
        .and_then(Value::as_array)
        .map(|cells| cells.iter().collect())
        .ok_or_else(|| TransformError::Invalid("Notebook has no cells".to_string()))
}

fn output_lines(output: &Value) -> Result<Vec<String>, TransformError> {
    let output_type = output
        .get("output_type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let text = match output_type {
        "stream" => join_text(output.get("text")),
        "execute_result" | "display_data" => {
            join_text(output.get("data").and_then(|d| d.get("text/plain")))
        }
        "error" => {
            let ename = output.get("ename").and_then(Value::as_str).unwrap_or_default();
            let evalue = output.get("evalue").and_then(Value::as_str).unwrap_or_default();
            format!("Error: {}: {}", ename, evalue)
        }
        other => {
            return Err(TransformError::Invalid(format!(
                "Unknown output type: {}",
                other
            )))
        }
    };

    Ok(text.lines().map(str::to_string).collect())
}

/// Notebook text fields are either a string or a list of string fragments
fn join_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_notebook(dir: &TempDir, value: &Value) -> std::path::PathBuf {
        let path = dir.path().join("nb.ipynb");
        fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_converts_cells() {
        let dir = TempDir::new().unwrap();
        let path = write_notebook(
            &dir,
            &json!({
                "cells": [
                    {"cell_type": "markdown", "source": ["# Title\n", "intro"]},
                    {"cell_type": "code", "source": "print(1)", "outputs": [
                        {"output_type": "stream", "text": ["1\n"]}
                    ]},
                    {"cell_type": "code", "source": [], "outputs": []}
                ]
            }),
        );

        let text = NotebookTransformer::default().transform(&path).unwrap();
        assert_eq!(
            text,
            "# Jupyter notebook converted to Python script.\n\n\
             \"\"\"\n# Title\nintro\n\"\"\"\n\n\
             print(1)\n# Output:\n#   1\n"
        );
    }

    #[test]
    fn test_outputs_can_be_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_notebook(
            &dir,
            &json!({"cells": [{"cell_type": "code", "source": "x", "outputs": [
                {"output_type": "execute_result", "data": {"text/plain": "42"}}
            ]}]}),
        );

        let transformer = NotebookTransformer {
            include_output: false,
        };
        let text = transformer.transform(&path).unwrap();
        assert!(!text.contains("# Output:"));
        assert!(text.ends_with("x\n"));
    }

    #[test]
    fn test_error_output() {
        let dir = TempDir::new().unwrap();
        let path = write_notebook(
            &dir,
            &json!({"cells": [{"cell_type": "code", "source": "1/0", "outputs": [
                {"output_type": "error", "ename": "ZeroDivisionError", "evalue": "division by zero"}
            ]}]}),
        );

        let text = NotebookTransformer::default().transform(&path).unwrap();
        assert!(text.contains("#   Error: ZeroDivisionError: division by zero"));
    }

    #[test]
    fn test_legacy_worksheets() {
        let dir = TempDir::new().unwrap();
        let path = write_notebook(
            &dir,
            &json!({"worksheets": [
                {"cells": [{"cell_type": "raw", "source": "a"}]},
                {"cells": [{"cell_type": "raw", "source": "b"}]}
            ]}),
        );

        let text = NotebookTransformer::default().transform(&path).unwrap();
        assert!(text.contains("\"\"\"\na\n\"\"\""));
        assert!(text.contains("\"\"\"\nb\n\"\"\""));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.ipynb");
        fs::write(&path, "{not json").unwrap();

        let err = NotebookTransformer::default().transform(&path).unwrap_err();
        assert!(matches!(err, TransformError::Json(_)));
    }

    #[test]
    fn test_unknown_cell_type_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_notebook(
            &dir,
            &json!({"cells": [{"cell_type": "widget", "source": "x"}]}),
        );

        let err = NotebookTransformer::default().transform(&path).unwrap_err();
        assert_eq!(err.to_string(), "Unknown cell type: widget");
    }

    #[test]
    fn test_registry_lookup_by_extension() {
        let registry = ContentTransformers::default();
        assert!(registry.for_path(Path::new("a/b.ipynb")).is_some());
        assert!(registry.for_path(Path::new("a/b.py")).is_none());
        assert!(registry.for_path(Path::new("Makefile")).is_none());
        assert!(ContentTransformers::empty()
            .for_path(Path::new("b.ipynb"))
            .is_none());
    }
}
