use clap::Parser;
use std::path::PathBuf;

use crate::config::parse_ratio;

#[derive(Parser, Debug)]
#[command(author, version, about = "Finds the light fixtures of an ETS project", long_about = None)]
pub struct Args {
    /// Path to the .knxproj file exported from ETS
    pub knxproj_path: PathBuf,

    /// Project password of an encrypted export
    #[arg(short, long)]
    pub password: Option<String>,

    /// Share of group addresses with warnings before the project is reported as poorly maintained
    #[arg(long, value_parser = parse_ratio)]
    pub warning_ratio: Option<f32>,

    /// Minimum share of a name that must match the primary switch name
    #[arg(long, value_parser = parse_ratio)]
    pub prefix_match_ratio: Option<f32>,

    /// Print the fixtures as JSON
    #[arg(long)]
    pub json: bool,
}
