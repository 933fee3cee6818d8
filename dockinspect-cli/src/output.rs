//! Output formatting abstraction for text vs JSON rendering
//!
//! All report output flows through [`OutputWriter`] which handles format switching.
//! This keeps format-specific logic out of the command flow entirely.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Callers use `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to any writer.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Effective configuration, secrets masked.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path, if one was loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub entries: Vec<ConfigEntry>,
}

#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl ConfigReport {
    pub fn new(source: Option<String>, entries: Vec<(&'static str, String)>) -> Self {
        Self {
            source,
            entries: entries
                .into_iter()
                .map(|(key, value)| ConfigEntry {
                    key: key.to_owned(),
                    value,
                })
                .collect(),
        }
    }
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.source {
            Some(source) => writeln!(w, "Configuration (source: {})", source.bold())?,
            None => writeln!(w, "Configuration (defaults, environment, and arguments)")?,
        }
        writeln!(w)?;
        for entry in &self.entries {
            writeln!(w, "{}={}", entry.key, entry.value)?;
        }
        Ok(())
    }
}

/// Container engine version.
#[derive(Serialize)]
pub struct EngineVersionReport {
    pub engine_version: String,
}

impl Render for EngineVersionReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Container engine version: {}", self.engine_version)
    }
}

/// Outcome of one inspection run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub strategy: String,
    pub documents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    pub uploaded: bool,
    pub cleanup_failures: usize,
}

impl Render for RunSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Inspection {} (strategy: {}, run: {})",
            "SUCCEEDED".green().bold(),
            self.strategy,
            self.run_id
        )?;
        for document in &self.documents {
            writeln!(w, "  Document: {document}")?;
        }
        if let Some(path) = &self.output_path {
            writeln!(w, "  Output: {path}")?;
        }
        if self.uploaded {
            writeln!(w, "  Uploaded to Hub: {}", "yes".green())?;
        }
        if self.cleanup_failures > 0 {
            writeln!(
                w,
                "  Cleanup: {}",
                format!("{} step(s) failed, see log", self.cleanup_failures).yellow()
            )?;
        }
        Ok(())
    }
}
