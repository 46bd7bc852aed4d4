pub mod error;
pub mod knx;
pub mod semantic;

pub use error::{KnxError, Location, ParseError, Result};
pub use knx::{
    load_knxproj,
    load_knxproj_bytes,
    load_knxproj_reader,
    DatapointType,
    GroupAddress,
    GroupAddressId,
    GroupAddressValue,
    KnxProject,
};
pub use semantic::{
    AnalysisState,
    AnalyzerConfig,
    Fixture,
    HeuristicCharacteristics,
    KnxProjectAnalyzer,
    KnxProjectCharacteristics,
    NamingConvention,
};

/// Loads a `.knxproj` file and infers its light fixtures with the given convention.
pub fn find_lights(
    path: impl AsRef<std::path::Path>,
    password: Option<&str>,
    convention: NamingConvention,
    config: AnalyzerConfig,
) -> Result<(KnxProject, Vec<Fixture>)> {
    let project = load_knxproj(path, password)?;
    let mut analyzer =
        KnxProjectAnalyzer::new(project, HeuristicCharacteristics::new(convention)).with_config(config);
    analyzer.analyze()?;
    Ok(analyzer.into_parts())
}
