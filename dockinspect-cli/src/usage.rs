//! `--help-properties` text, generated from the option table.

use std::fmt::Write;

use dockinspect_core::config::ConfigOption;

/// Renders the usage text for the given options.
///
/// One line per option: `  <key> [<Type>]: <description>; default: <default>`.
pub fn usage_text(options: &[&ConfigOption]) -> String {
    let mut text = String::from(
        "Usage: dockinspect [OPTIONS] --<property>=<value> ...\n\nAvailable properties:\n",
    );
    for option in options {
        let _ = writeln!(
            text,
            "  {} [{}]: {}; default: {}",
            option.key,
            option.value_type.as_str(),
            option.description,
            option.default_value
        );
    }
    text
}
