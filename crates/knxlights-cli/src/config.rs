use std::path::PathBuf;

use knxlights_core::semantic::{DEFAULT_PREFIX_MATCH_THRESHOLD, DEFAULT_WARNING_RATIO_THRESHOLD};
use knxlights_core::{AnalyzerConfig, NamingConvention};

use crate::cli::Args;

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub knxproj_path: PathBuf,
    pub password: Option<String>,
    pub warning_ratio_threshold: f32,
    pub prefix_match_threshold: f32,
    pub json: bool,
}

impl CliConfig {
    /// Arguments win over `KNXLIGHTS_*` environment variables, which win over defaults.
    pub fn from_args(args: &Args) -> Self {
        let password = args
            .password
            .clone()
            .or_else(|| std::env::var("KNXLIGHTS_PASSWORD").ok())
            .filter(|value| !value.is_empty());
        let warning_ratio_threshold = args
            .warning_ratio
            .or_else(|| read_ratio_env("KNXLIGHTS_WARNING_RATIO"))
            .unwrap_or(DEFAULT_WARNING_RATIO_THRESHOLD);
        let prefix_match_threshold = args
            .prefix_match_ratio
            .or_else(|| read_ratio_env("KNXLIGHTS_PREFIX_MATCH_RATIO"))
            .unwrap_or(DEFAULT_PREFIX_MATCH_THRESHOLD);

        Self {
            knxproj_path: args.knxproj_path.clone(),
            password,
            warning_ratio_threshold,
            prefix_match_threshold,
            json: args.json,
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            warning_ratio_threshold: self.warning_ratio_threshold,
        }
    }

    pub fn naming_convention(&self) -> NamingConvention {
        NamingConvention::default().with_prefix_match_threshold(self.prefix_match_threshold)
    }

    pub fn has_knxproj_extension(&self) -> bool {
        self.knxproj_path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("knxproj"))
    }
}

fn read_ratio_env(key: &str) -> Option<f32> {
    let raw = std::env::var(key).ok()?;
    match parse_ratio(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Ignoring {}: {}", key, err);
            None
        }
    }
}

/// Parses a ratio between 0 and 1, for flags and environment alike.
pub fn parse_ratio(raw: &str) -> Result<f32, String> {
    match raw.trim().parse::<f32>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(value),
        _ => Err(format!("'{}' is not a ratio between 0 and 1", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn ratios_must_be_between_zero_and_one() {
        assert_eq!(parse_ratio("0.25"), Ok(0.25));
        assert_eq!(parse_ratio(" 1 "), Ok(1.0));
        assert!(parse_ratio("1.5").is_err());
        assert!(parse_ratio("-0.1").is_err());
        assert!(parse_ratio("many").is_err());
    }

    #[test]
    fn flags_reject_ratios_out_of_range() {
        for flag in ["--warning-ratio", "--prefix-match-ratio"] {
            let parsed = Args::try_parse_from(["knxlights", "Haus.knxproj", flag, "1.5"]);
            assert!(parsed.is_err(), "{} accepted 1.5", flag);
        }
    }

    #[test]
    fn arguments_override_defaults() {
        let args = Args::parse_from([
            "knxlights",
            "Haus.KNXPROJ",
            "--warning-ratio",
            "0.5",
            "--prefix-match-ratio",
            "0.8",
            "--password",
            "geheim",
            "--json",
        ]);
        let config = CliConfig::from_args(&args);
        assert_eq!(config.warning_ratio_threshold, 0.5);
        assert_eq!(config.naming_convention().prefix_match_threshold, 0.8);
        assert_eq!(config.password.as_deref(), Some("geheim"));
        assert!(config.json);
        assert!(config.has_knxproj_extension());
    }

    #[test]
    fn other_extensions_are_flagged() {
        let args = Args::parse_from(["knxlights", "export.zip", "--warning-ratio", "0.2"]);
        let config = CliConfig::from_args(&args);
        assert!(!config.has_knxproj_extension());
        assert_eq!(config.analyzer_config().warning_ratio_threshold, 0.2);
    }
}
