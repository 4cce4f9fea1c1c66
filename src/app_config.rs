//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use page_loader_core::{MAX_CONCURRENCY, MIN_CONCURRENCY};

/// File configuration for page-loader defaults (`key = value` lines).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default output directory.
    pub output_dir: Option<PathBuf>,
    /// Default number of concurrent fetches and writes.
    pub concurrency: Option<u8>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&usize::from(concurrency))
        {
            bail!(
                "Invalid config value for `concurrency`: {concurrency}. Expected range: {MIN_CONCURRENCY}..={MAX_CONCURRENCY}"
            );
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Log filter used when neither `RUST_LOG` nor CLI flags decide.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/page-loader/config.toml`
/// 2. `$HOME/.config/page-loader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let base = non_empty_env("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty_env("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("page-loader").join("config.toml"))
}

fn non_empty_env(name: &str) -> Option<std::ffi::OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads config from the default path; a missing file yields `None`.
pub fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.is_file() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = without_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };
        let (key, value) = (key.trim(), value.trim());
        let invalid = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "output_dir" => cfg.output_dir = Some(quoted(value).with_context(invalid)?.into()),
            "concurrency" => cfg.concurrency = Some(value.parse::<u8>().with_context(invalid)?),
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(value.parse::<u64>().with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(value.parse::<u64>().with_context(invalid)?);
            }
            "verbosity" => {
                let setting = quoted(value).and_then(str::parse::<VerbositySetting>);
                cfg.verbosity = Some(setting.with_context(invalid)?);
            }
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_number}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Cuts the line at the first `#` that is not inside a double-quoted string.
fn without_comment(line: &str) -> &str {
    let mut quotes = 0_usize;
    let cut = line.find(|c: char| {
        if c == '"' {
            quotes += 1;
        }
        c == '#' && quotes % 2 == 0
    });
    cut.map_or(line, |index| &line[..index])
}

fn quoted(value: &str) -> Result<&str> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| anyhow::anyhow!("Expected double-quoted string"))
}

impl std::str::FromStr for VerbositySetting {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "default" => Ok(Self::Default),
            "verbose" => Ok(Self::Verbose),
            "quiet" => Ok(Self::Quiet),
            "debug" => Ok(Self::Debug),
            other => bail!("Unknown verbosity '{other}'; expected default, verbose, quiet or debug"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let raw = r#"
            # page-loader defaults
            output_dir = "/srv/pages"   # saved pages go here
            concurrency = 4
            connect_timeout_secs = 10
            read_timeout_secs = 120
            verbosity = "verbose"
        "#;

        let cfg = parse_config_str(raw).unwrap();

        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/pages")));
        assert_eq!(cfg.concurrency, Some(4));
        assert_eq!(cfg.connect_timeout_secs, Some(10));
        assert_eq!(cfg.read_timeout_secs, Some(120));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
    }

    #[test]
    fn test_parse_config_empty_is_default() {
        let cfg = parse_config_str("\n# nothing here\n").unwrap();
        assert_eq!(cfg, FileConfig::default());
    }

    #[test]
    fn test_parse_config_keeps_hash_inside_string() {
        let cfg = parse_config_str(r#"output_dir = "/tmp/#pages""#).unwrap();
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/#pages")));
    }

    #[test]
    fn test_parse_config_unknown_key_reports_line() {
        let err = parse_config_str("concurrency = 2\nretries = 3").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("retries"), "Expected key in: {msg}");
        assert!(msg.contains("line 2"), "Expected line number in: {msg}");
    }

    #[test]
    fn test_parse_config_missing_equals() {
        let err = parse_config_str("concurrency 2").unwrap_err();
        assert!(err.to_string().contains("expected key = value"));
    }

    #[test]
    fn test_parse_config_rejects_out_of_range_concurrency() {
        assert!(parse_config_str("concurrency = 0").is_err());
        assert!(parse_config_str("concurrency = 101").is_err());
        assert!(parse_config_str("concurrency = 300").is_err());
    }

    #[test]
    fn test_parse_config_rejects_out_of_range_timeout() {
        assert!(parse_config_str("connect_timeout_secs = 0").is_err());
        assert!(parse_config_str("read_timeout_secs = 3601").is_err());
        assert!(parse_config_str("read_timeout_secs = -5").is_err());
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        assert!(parse_config_str("output_dir = /srv/pages").is_err());
        assert!(parse_config_str(r#"verbosity = "loud""#).is_err());
    }

    #[test]
    fn test_parse_config_rejects_non_numeric_and_lone_quote() {
        assert!(parse_config_str("concurrency = four").is_err());
        assert!(parse_config_str(r#"output_dir = ""#).is_err());
    }

    #[test]
    fn test_verbosity_from_str() {
        assert_eq!("quiet".parse::<VerbositySetting>().unwrap(), VerbositySetting::Quiet);
        assert!("loud".parse::<VerbositySetting>().is_err());
    }

    #[test]
    fn test_verbosity_log_levels() {
        assert_eq!(VerbositySetting::Default.log_level(), "info");
        assert_eq!(VerbositySetting::Quiet.log_level(), "error");
        assert_eq!(VerbositySetting::Verbose.log_level(), "debug");
        assert_eq!(VerbositySetting::Debug.log_level(), "trace");
    }

    #[test]
    fn test_load_file_config_reads_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "concurrency = 7\n").unwrap();

        let cfg = load_file_config(&path).unwrap();
        assert_eq!(cfg.concurrency, Some(7));
    }

    #[test]
    fn test_load_file_config_parse_error_names_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "bogus\n").unwrap();

        let err = load_file_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
