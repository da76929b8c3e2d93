//! Command-line interface.
//!
//! The reference behavior takes no flags at all; everything lives in the
//! configuration. The CLI only adds what a batch tool can't do without:
//! pointing at a config file and turning up the logs.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "vitrine",
    version,
    about = "Scan media roots, refresh thumbnail caches, and write a static gallery page"
)]
pub struct Args {
    /// Use an explicit configuration file instead of the default lookup.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default log filter, used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_filters() {
        let parse = |argv: &[&str]| Args::try_parse_from(argv).unwrap();
        assert_eq!(parse(&["vitrine"]).log_filter(), "info");
        assert_eq!(parse(&["vitrine", "-v"]).log_filter(), "debug");
        assert_eq!(parse(&["vitrine", "-vvv"]).log_filter(), "trace");
    }

    #[test]
    fn config_path_is_optional() {
        let args = Args::try_parse_from(["vitrine", "--config", "elsewhere.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("elsewhere.toml")));
        assert_eq!(Args::try_parse_from(["vitrine"]).unwrap().config, None);
    }
}
