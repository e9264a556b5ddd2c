//! `deadends config`: where the configuration came from, and what it is.

use super::CliResult;
use crate::config::DeadendsConfig;
use std::io::{self, Write};

/// Writes the config source line, followed by the effective TOML when `show`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_config<W: Write>(writer: &mut W, config: &DeadendsConfig, show: bool) -> CliResult {
    match &config.source {
        Some(path) => writeln!(writer, "# loaded from {}", path.display())?,
        None => writeln!(writer, "# built-in defaults")?,
    }
    if show {
        write!(writer, "{}", config.to_toml()?)?;
    }
    Ok(())
}

/// Executes the config command.
///
/// # Errors
///
/// Returns an error if serialization or output fails.
pub fn cmd_config(config: &DeadendsConfig, show: bool) -> CliResult {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_config(&mut handle, config, show)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_show_toml() {
        let mut out = Vec::new();
        write_config(&mut out, &DeadendsConfig::new(), true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# built-in defaults\n"));
        assert!(text.contains("data_dir = \"data/canons\""));
    }

    #[test]
    fn test_source_only_without_show() {
        let mut out = Vec::new();
        write_config(&mut out, &DeadendsConfig::new(), false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "# built-in defaults\n");
    }
}
