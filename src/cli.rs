//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Serve the exam-paper catalog and proxy PDF downloads.
///
/// Each paper is fetched from the first mirror that returns a valid PDF;
/// batches are bundled into a ZIP with placeholders for missing papers.
#[derive(Parser, Debug)]
#[command(name = "exampapers")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Listen address (default 127.0.0.1:5000)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Config file (default $XDG_CONFIG_HOME/exampapers/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON catalog file replacing the built-in catalog
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Directory holding index.html and static assets
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Maximum in-flight mirror fetches across all requests (1-100)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub pool_size: Option<u8>,

    /// Per-request download timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub fetch_timeout: Option<u64>,

    /// Per-request availability probe timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub probe_timeout: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["exampapers"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.bind.is_none());
        assert!(args.pool_size.is_none());
        assert!(args.catalog.is_none());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["exampapers", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["exampapers", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["exampapers", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["exampapers", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["exampapers", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["exampapers", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_bind_and_paths() {
        let args = Args::try_parse_from([
            "exampapers",
            "-b",
            "0.0.0.0:8000",
            "--catalog",
            "papers.json",
            "--static-dir",
            "web",
            "--config",
            "server.toml",
        ])
        .unwrap();
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8000"));
        assert_eq!(args.catalog, Some(PathBuf::from("papers.json")));
        assert_eq!(args.static_dir, Some(PathBuf::from("web")));
        assert_eq!(args.config, Some(PathBuf::from("server.toml")));
    }

    #[test]
    fn test_cli_pool_size_bounds() {
        let args = Args::try_parse_from(["exampapers", "-c", "1"]).unwrap();
        assert_eq!(args.pool_size, Some(1));
        let args = Args::try_parse_from(["exampapers", "--pool-size", "100"]).unwrap();
        assert_eq!(args.pool_size, Some(100));

        let err = Args::try_parse_from(["exampapers", "-c", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        let err = Args::try_parse_from(["exampapers", "-c", "101"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_timeouts() {
        let args =
            Args::try_parse_from(["exampapers", "--fetch-timeout", "30", "--probe-timeout", "2"])
                .unwrap();
        assert_eq!(args.fetch_timeout, Some(30));
        assert_eq!(args.probe_timeout, Some(2));

        let err = Args::try_parse_from(["exampapers", "--fetch-timeout", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
