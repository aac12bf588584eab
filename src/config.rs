//! Server configuration: optional config file merged with CLI flags.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use exampapers_core::fetch::{
    CONNECT_TIMEOUT, DEFAULT_BATCH_CONCURRENCY, DEFAULT_POOL_SIZE, FETCH_TIMEOUT, FetchConfig,
    MAX_CONCURRENCY, MIN_CONCURRENCY, PROBE_TIMEOUT,
};
use exampapers_core::server::{DEFAULT_MAX_BATCH_PAPERS, ServerSettings};

use crate::cli::Args;

/// Address the server binds when nothing else is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Values read from the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Listen address, e.g. `"0.0.0.0:5000"`.
    pub bind: Option<SocketAddr>,
    /// Engine-wide fetch pool size.
    pub pool_size: Option<usize>,
    /// Per-request concurrency for ZIP batches.
    pub batch_concurrency: Option<usize>,
    pub fetch_timeout_secs: Option<u64>,
    pub probe_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    /// Batch deadline; absent means batches wait for every record.
    pub batch_deadline_secs: Option<u64>,
    /// Largest accepted ZIP batch; may only lower the default of 100.
    pub max_batch_papers: Option<usize>,
    /// JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Directory serving `index.html` and `/static`.
    pub static_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Validates value ranges.
    pub fn validate(&self) -> Result<()> {
        validate_concurrency("pool_size", self.pool_size)?;
        validate_concurrency("batch_concurrency", self.batch_concurrency)?;
        validate_timeout_secs("fetch_timeout_secs", self.fetch_timeout_secs)?;
        validate_timeout_secs("probe_timeout_secs", self.probe_timeout_secs)?;
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("batch_deadline_secs", self.batch_deadline_secs)?;

        if let Some(max) = self.max_batch_papers
            && !(1..=DEFAULT_MAX_BATCH_PAPERS).contains(&max)
        {
            bail!(
                "Invalid config value for `max_batch_papers`: {max}. Expected range: 1..={DEFAULT_MAX_BATCH_PAPERS}"
            );
        }
        Ok(())
    }
}

fn validate_concurrency(field: &str, value: Option<usize>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&value) {
        bail!(
            "Invalid config value for `{field}`: {value}. Expected range: {MIN_CONCURRENCY}..={MAX_CONCURRENCY}"
        );
    }
    Ok(())
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

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind: SocketAddr,
    pub fetch: FetchConfig,
    pub server: ServerSettings,
    pub catalog_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Merges file values under explicit CLI flags, then defaults.
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self> {
        let bind = match args.bind.as_deref() {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid --bind address '{raw}'"))?,
            None => file.bind.unwrap_or(parse_default_bind()?),
        };

        let fetch = FetchConfig {
            pool_size: args
                .pool_size
                .map(usize::from)
                .or(file.pool_size)
                .unwrap_or(DEFAULT_POOL_SIZE),
            fetch_timeout: args
                .fetch_timeout
                .or(file.fetch_timeout_secs)
                .map_or(FETCH_TIMEOUT, Duration::from_secs),
            probe_timeout: args
                .probe_timeout
                .or(file.probe_timeout_secs)
                .map_or(PROBE_TIMEOUT, Duration::from_secs),
            connect_timeout: file
                .connect_timeout_secs
                .map_or(CONNECT_TIMEOUT, Duration::from_secs),
            batch_deadline: file.batch_deadline_secs.map(Duration::from_secs),
        };

        let server = ServerSettings {
            batch_concurrency: file.batch_concurrency.unwrap_or(DEFAULT_BATCH_CONCURRENCY),
            max_batch_papers: file.max_batch_papers.unwrap_or(DEFAULT_MAX_BATCH_PAPERS),
            static_dir: args.static_dir.clone().or(file.static_dir),
        };

        Ok(Self {
            bind,
            fetch,
            server,
            catalog_path: args.catalog.clone().or(file.catalog_path),
        })
    }
}

fn parse_default_bind() -> Result<SocketAddr> {
    DEFAULT_BIND
        .parse()
        .map_err(|e| anyhow!("Invalid default bind address: {e}"))
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/exampapers/config.toml`
/// 2. `$HOME/.config/exampapers/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("exampapers")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("exampapers")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist. The default path is optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return read_config_file(path);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => read_config_file(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_no = line_index + 1;
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "bind" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.bind = Some(parsed.parse::<SocketAddr>().with_context(invalid)?);
            }
            "pool_size" => cfg.pool_size = Some(parse_usize(value).with_context(invalid)?),
            "batch_concurrency" => {
                cfg.batch_concurrency = Some(parse_usize(value).with_context(invalid)?);
            }
            "fetch_timeout_secs" => {
                cfg.fetch_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "probe_timeout_secs" => {
                cfg.probe_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "batch_deadline_secs" => {
                cfg.batch_deadline_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "max_batch_papers" => {
                cfg.max_batch_papers = Some(parse_usize(value).with_context(invalid)?);
            }
            "catalog_path" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.catalog_path = Some(PathBuf::from(parsed));
            }
            "static_dir" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.static_dir = Some(PathBuf::from(parsed));
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow!("Integer value out of range for u64"))
}

fn parse_usize(raw_value: &str) -> Result<usize> {
    let value = parse_integer_u64(raw_value)?;
    usize::try_from(value).map_err(|_| anyhow!("Integer value out of range for usize"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["exampapers"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
pool_size = 8
static_dir = "/srv/exampapers"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.pool_size, Some(8));
        assert_eq!(cfg.static_dir, Some(PathBuf::from("/srv/exampapers")));
        assert!(cfg.bind.is_none());
        assert!(cfg.batch_deadline_secs.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
bind = "0.0.0.0:8080"
pool_size = 30
batch_concurrency = 12
fetch_timeout_secs = 20
probe_timeout_secs = 3
connect_timeout_secs = 7
batch_deadline_secs = 90
max_batch_papers = 50
catalog_path = "papers.json"
static_dir = "public"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.bind, Some("0.0.0.0:8080".parse().unwrap()));
        assert_eq!(cfg.batch_concurrency, Some(12));
        assert_eq!(cfg.batch_deadline_secs, Some(90));
        assert_eq!(cfg.max_batch_papers, Some(50));
        assert_eq!(cfg.catalog_path, Some(PathBuf::from("papers.json")));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
pool_size = 4 # workers
static_dir = "web#1" # hash inside quotes survives
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.pool_size, Some(4));
        assert_eq!(cfg.static_dir, Some(PathBuf::from("web#1")));
    }

    #[test]
    fn test_parse_config_rejects_invalid_pool_size() {
        let err = parse_config_str("pool_size = 0").expect_err("invalid pool_size expected");
        assert!(err.to_string().contains("pool_size"));

        let err = parse_config_str("pool_size = 101").expect_err("invalid pool_size expected");
        assert!(err.to_string().contains("pool_size"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err = parse_config_str("fetch_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("fetch_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_bind() {
        let err = parse_config_str("bind = 127.0.0.1:5000").expect_err("unquoted string");
        assert!(format!("{err:#}").contains("bind"));
    }

    #[test]
    fn test_parse_config_rejects_bad_bind_address() {
        let err = parse_config_str(r#"bind = "not-an-addr""#).expect_err("bad address");
        assert!(format!("{err:#}").contains("bind"));
    }

    #[test]
    fn test_parse_config_max_batch_papers_capped_at_default() {
        let cfg = parse_config_str("max_batch_papers = 100").expect("100 is allowed");
        assert_eq!(cfg.max_batch_papers, Some(100));

        let err = parse_config_str("max_batch_papers = 101").expect_err("above the cap");
        assert!(err.to_string().contains("max_batch_papers"));
        assert!(err.to_string().contains("1..=100"));

        let err = parse_config_str("max_batch_papers = 0").expect_err("below the range");
        assert!(err.to_string().contains("max_batch_papers"));
    }

    #[test]
    fn test_parse_config_rejects_trailing_tokens() {
        let err = parse_config_str("pool_size = 4 trailing").expect_err("trailing token error");
        assert!(err.to_string().contains("pool_size"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("pool_size 4").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_load_file_config_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_batch_papers = 25").unwrap();
        let cfg = load_file_config(Some(file.path())).unwrap();
        assert_eq!(cfg.max_batch_papers, Some(25));
    }

    #[test]
    fn test_load_file_config_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_file_config(Some(&missing)).expect_err("missing file");
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = RuntimeConfig::resolve(&args(&[]), FileConfig::default()).unwrap();
        assert_eq!(resolved.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(resolved.fetch, FetchConfig::default());
        assert_eq!(resolved.server, ServerSettings::default());
        assert!(resolved.catalog_path.is_none());
    }

    #[test]
    fn test_resolve_file_values_apply() {
        let file = FileConfig {
            pool_size: Some(7),
            batch_deadline_secs: Some(30),
            batch_concurrency: Some(3),
            ..FileConfig::default()
        };
        let resolved = RuntimeConfig::resolve(&args(&[]), file).unwrap();
        assert_eq!(resolved.fetch.pool_size, 7);
        assert_eq!(resolved.fetch.batch_deadline, Some(Duration::from_secs(30)));
        assert_eq!(resolved.server.batch_concurrency, 3);
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file = FileConfig {
            bind: Some("0.0.0.0:80".parse().unwrap()),
            pool_size: Some(7),
            fetch_timeout_secs: Some(30),
            static_dir: Some(PathBuf::from("from-file")),
            ..FileConfig::default()
        };
        let cli = args(&[
            "--bind",
            "127.0.0.1:8081",
            "-c",
            "12",
            "--fetch-timeout",
            "9",
            "--static-dir",
            "from-cli",
        ]);
        let resolved = RuntimeConfig::resolve(&cli, file).unwrap();
        assert_eq!(resolved.bind, "127.0.0.1:8081".parse().unwrap());
        assert_eq!(resolved.fetch.pool_size, 12);
        assert_eq!(resolved.fetch.fetch_timeout, Duration::from_secs(9));
        assert_eq!(resolved.server.static_dir, Some(PathBuf::from("from-cli")));
    }

    #[test]
    fn test_resolve_rejects_bad_cli_bind() {
        let err = RuntimeConfig::resolve(&args(&["--bind", "nowhere"]), FileConfig::default())
            .expect_err("bad bind");
        assert!(err.to_string().contains("--bind"));
    }
}
