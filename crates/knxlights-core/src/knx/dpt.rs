use serde::Serialize;
use std::fmt;

/// Code used for datapoint type labels nobody recognises.
pub const UNKNOWN_DATAPOINT_TYPE: &str = "0.000";

/// The datapoint types relevant for fixture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DatapointType {
    Switch,
    Bool,
    Enable,
    UpDown,
    OpenClose,
    State,
    ControlDimming,
    Scaling,
}

impl DatapointType {
    pub const ALL: [DatapointType; 8] = [
        DatapointType::Switch,
        DatapointType::Bool,
        DatapointType::Enable,
        DatapointType::UpDown,
        DatapointType::OpenClose,
        DatapointType::State,
        DatapointType::ControlDimming,
        DatapointType::Scaling,
    ];

    /// Canonical `main.sub` code.
    pub const fn code(&self) -> &'static str {
        match self {
            DatapointType::Switch => "1.001",
            DatapointType::Bool => "1.002",
            DatapointType::Enable => "1.003",
            DatapointType::UpDown => "1.008",
            DatapointType::OpenClose => "1.009",
            DatapointType::State => "1.011",
            DatapointType::ControlDimming => "3.007",
            DatapointType::Scaling => "5.001",
        }
    }

    /// Looks up a canonical code. Unknown codes are not an error.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dpt| dpt.code() == code)
    }
}

impl fmt::Display for DatapointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Normalizes a raw `DatapointType` attribute into the canonical `main.sub` form.
///
/// Accepts `DPST-<main>-<sub>`, `DPT-<main>` and the legacy `1 Bit`/`2 Bit`
/// labels. Anything else maps to [`UNKNOWN_DATAPOINT_TYPE`]. `context` only
/// feeds the log output.
pub fn decode_datapoint_type(raw: Option<&str>, context: &dyn fmt::Display) -> Option<String> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;

    match raw {
        "1 Bit" => return Some("1.001".to_string()),
        "2 Bit" => return Some("2.001".to_string()),
        _ => {}
    }

    let mut value = raw;
    if let Some(index) = raw.find(char::is_whitespace) {
        log::warn!(
            "Found invalid DPT '{}' at {}. Dropping everything following including first space.",
            raw,
            context
        );
        value = &raw[..index];
    }

    let mut parts = value.split('-');
    let decoded = match parts.next() {
        Some("DPST") => parse_number(parts.next())
            .zip(parse_number(parts.next()))
            .map(|(main, sub)| format!("{}.{:03}", main, sub)),
        Some("DPT") => parse_number(parts.next()).map(|main| format!("{}.000", main)),
        _ => None,
    };

    match decoded {
        Some(code) => Some(code),
        None => {
            log::warn!("Unrecognized DPT '{}' at {}", raw, context);
            Some(UNKNOWN_DATAPOINT_TYPE.to_string())
        }
    }
}

fn parse_number(part: Option<&str>) -> Option<u32> {
    part.and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Option<String> {
        decode_datapoint_type(Some(raw), &"test")
    }

    #[test]
    fn decodes_numeric_forms() {
        assert_eq!(decode("DPST-1-1").as_deref(), Some("1.001"));
        assert_eq!(decode("DPST-5-1").as_deref(), Some("5.001"));
        assert_eq!(decode("DPST-3-7").as_deref(), Some("3.007"));
        assert_eq!(decode("DPST-232-600").as_deref(), Some("232.600"));
        assert_eq!(decode("DPT-9").as_deref(), Some("9.000"));
    }

    #[test]
    fn decodes_legacy_labels() {
        assert_eq!(decode("1 Bit").as_deref(), Some("1.001"));
        assert_eq!(decode("2 Bit").as_deref(), Some("2.001"));
        assert_eq!(decode("Whatever").as_deref(), Some(UNKNOWN_DATAPOINT_TYPE));
    }

    #[test]
    fn truncates_at_first_whitespace() {
        assert_eq!(decode("DPST-1-1 DPST-1-11").as_deref(), Some("1.001"));
        assert_eq!(decode("DPT-5\tfoo").as_deref(), Some("5.000"));
    }

    #[test]
    fn malformed_numbers_are_unknown() {
        assert_eq!(decode("DPST-x-1").as_deref(), Some(UNKNOWN_DATAPOINT_TYPE));
        assert_eq!(decode("DPST-1").as_deref(), Some(UNKNOWN_DATAPOINT_TYPE));
    }

    #[test]
    fn blank_is_absent() {
        assert_eq!(decode_datapoint_type(None, &"test"), None);
        assert_eq!(decode("   "), None);
    }

    #[test]
    fn lookup_by_code() {
        assert_eq!(DatapointType::from_code("1.001"), Some(DatapointType::Switch));
        assert_eq!(DatapointType::from_code("1.011"), Some(DatapointType::State));
        assert_eq!(DatapointType::from_code("3.007"), Some(DatapointType::ControlDimming));
        assert_eq!(DatapointType::from_code("5.001"), Some(DatapointType::Scaling));
        assert_eq!(DatapointType::from_code("9.001"), None);
        assert_eq!(DatapointType::from_code(UNKNOWN_DATAPOINT_TYPE), None);
    }
}
