//! Renderer module
//!
//! Renders a [`Digest`] to the supported output formats: text and json

use serde::Serialize;
use std::io::Write;

use crate::core::config::{LimitsReport, ScanLimits};
use crate::core::model::Digest;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Summary, tree and content as plain text
    #[default]
    Text,
    /// A single JSON object with every section, warnings and limits
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with default options
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// JSON shape of a rendered digest
#[derive(Debug, Serialize)]
struct DigestReport<'a> {
    summary: &'a str,
    tree: &'a str,
    content: &'a str,
    estimated_tokens: Option<usize>,
    warnings: Vec<String>,
    limits: LimitsReport,
}

/// Renderer for digests
pub struct Renderer {
    config: RenderConfig,
    limits: ScanLimits,
    max_input_tokens: Option<usize>,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self::with_config(RenderConfig::new(format))
    }

    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            config,
            limits: ScanLimits::default(),
            max_input_tokens: None,
        }
    }

    /// Limits reported in the JSON output
    pub fn with_limits(mut self, limits: ScanLimits, max_input_tokens: Option<usize>) -> Self {
        self.limits = limits;
        self.max_input_tokens = max_input_tokens;
        self
    }

    /// Render a digest to a string
    pub fn render(&self, digest: &Digest) -> String {
        match self.config.format {
            OutputFormat::Text => self.render_text(digest),
            OutputFormat::Json => self.render_json(digest),
        }
    }

    /// Render to a writer
    pub fn render_to<W: Write>(&self, digest: &Digest, mut writer: W) -> std::io::Result<()> {
        let output = self.render(digest);
        writer.write_all(output.as_bytes())
    }

    fn render_text(&self, digest: &Digest) -> String {
        format!("{}\n\n{}\n{}", digest.summary, digest.tree, digest.content)
    }

    fn render_json(&self, digest: &Digest) -> String {
        let report = DigestReport {
            summary: &digest.summary,
            tree: &digest.tree,
            content: &digest.content,
            estimated_tokens: digest.estimated_tokens,
            warnings: digest.warning_messages(),
            limits: self.limits.report(self.max_input_tokens),
        };

        let rendered = if self.config.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        rendered.unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::warning::{ScanWarning, WarningCode};
    use serde_json::Value;

    fn sample_digest() -> Digest {
        Digest {
            summary: "Directory: me/project\nFiles analyzed: 1\n\nEstimated tokens: 12".to_string(),
            tree: "Directory structure:\n└── project/\n    └── a.txt\n".to_string(),
            content: "a.txt block\n\n".to_string(),
            estimated_tokens: Some(12),
            warnings: vec![ScanWarning::new(
                WarningCode::FileLimitReached,
                "Maximum file limit (1) reached",
            )],
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_text() {
        let output = Renderer::new(OutputFormat::Text).render(&sample_digest());
        assert!(output.starts_with("Directory: me/project\n"));
        assert!(output.contains("Estimated tokens: 12\n\nDirectory structure:\n"));
        assert!(output.ends_with("a.txt\n\na.txt block\n\n"));
    }

    #[test]
    fn test_render_json() {
        let output = Renderer::new(OutputFormat::Json)
            .with_limits(ScanLimits::default(), Some(250_000))
            .render(&sample_digest());
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["estimated_tokens"], 12);
        assert_eq!(value["warnings"][0], "Maximum file limit (1) reached");
        assert_eq!(value["limits"]["max_file_size"], "10.0 MB");
        assert_eq!(value["limits"]["max_files"], 10_000);
        assert_eq!(value["limits"]["max_input_tokens"], 250_000);
        assert!(value["tree"].as_str().unwrap().contains("a.txt"));
    }

    #[test]
    fn test_render_json_pretty_is_multiline() {
        let config = RenderConfig::with_pretty(OutputFormat::Json, true);
        let output = Renderer::with_config(config).render(&sample_digest());
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_render_to_writer() {
        let mut buffer = Vec::new();
        Renderer::new(OutputFormat::Text)
            .render_to(&sample_digest(), &mut buffer)
            .unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains("Files analyzed: 1"));
    }
}
