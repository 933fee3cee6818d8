//! `dockinspect --help-properties` handler

use std::io::Write;

use dockinspect_core::config::Config;

use crate::error::CliError;
use crate::usage::usage_text;

/// Print the public configuration properties.
///
/// Always plain text: the listing is a help screen, not a report.
pub fn execute(w: &mut dyn Write) -> Result<(), CliError> {
    w.write_all(usage_text(&Config::public_options()).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_usage_text() {
        let mut buffer = Vec::new();
        execute(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("Usage: dockinspect"));
        assert!(text.contains("  docker.tar [String]: "));
    }
}
