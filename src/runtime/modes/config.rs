//! Config mode
//!
//! `generate-config` and `check-config` commands.

use std::path::Path;

use colored::Colorize;

use crate::config::{ConfigIssue, StaticConfig};
use crate::errors::{RelayError, Result};

/// Generate example configuration file
///
/// 未指定输出路径时打印到 stdout。
pub fn generate_config(output_path: Option<&str>, force: bool) -> Result<()> {
    let Some(path) = output_path else {
        print!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    };

    if Path::new(path).exists() && !force {
        return Err(RelayError::file_operation(format!(
            "{} already exists; use --force to overwrite",
            path
        )));
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    StaticConfig::default().save_to_file(path).map_err(|e| {
        println!(
            "  {} {}",
            "Failed to generate configuration file".red(),
            e.to_string().red()
        );
        RelayError::file_operation(format!("Unable to write configuration file: {}", e))
    })?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}

fn print_issue(issue: &ConfigIssue) {
    if issue.is_error() {
        println!(
            "  {} {}: {}",
            "[ERROR]".red().bold(),
            issue.key.yellow(),
            issue.message
        );
    } else {
        println!(
            "  {} {}: {}",
            "[WARN]".yellow().bold(),
            issue.key.yellow(),
            issue.message
        );
    }
}

/// Check configuration and print every issue
///
/// Returns `Ok(false)` when at least one issue is an error.
pub fn check_config(config: &StaticConfig, source: &str) -> Result<bool> {
    println!("{} {}", "Checking configuration".cyan(), source.blue());

    let issues = config.validate();
    if issues.is_empty() {
        println!("  {}", "No issues found".green());
        return Ok(true);
    }

    issues.iter().for_each(print_issue);

    let errors = issues.iter().filter(|i| i.is_error()).count();
    let warnings = issues.len() - errors;
    let summary = format!("{} error(s), {} warning(s)", errors, warnings);
    if errors > 0 {
        println!("  {}", summary.red().bold());
    } else {
        println!("  {}", summary.yellow());
    }

    Ok(errors == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_config_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        let path = path.to_str().unwrap();

        generate_config(Some(path), false).unwrap();
        let loaded = StaticConfig::load_from(path);
        assert_eq!(loaded.users.backend, "memory");
        assert_eq!(loaded.relay.max_message_chars, 4096);
    }

    #[test]
    fn test_generate_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "# keep me\n").unwrap();
        let path = path.to_str().unwrap();

        let err = generate_config(Some(path), false).unwrap_err();
        assert!(matches!(err, RelayError::FileOperation(_)));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# keep me\n");

        generate_config(Some(path), true).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("[server]"));
    }

    #[test]
    fn test_check_config_reports_errors() {
        let mut config = StaticConfig::default();
        assert!(check_config(&config, "defaults").unwrap());

        config.server.port = 0;
        assert!(!check_config(&config, "defaults").unwrap());
    }
}
