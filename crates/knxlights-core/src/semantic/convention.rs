use std::collections::BTreeSet;

pub const DEFAULT_PREFIX_MATCH_THRESHOLD: f32 = 0.6;

/// Vocabulary and naming rules a project is expected to follow.
///
/// Terms are compared after text analysis, so they must be given in their
/// stemmed, umlaut-free form (`ruckmeldung`, not `Rückmeldungen`).
#[derive(Debug, Clone)]
pub struct NamingConvention {
    /// Terms identifying a light.
    pub light_terms: BTreeSet<String>,
    /// Terms identifying a status or feedback address.
    pub status_terms: BTreeSet<String>,
    /// Raw name prefixes identifying a light (`L_EG01_01`).
    pub light_prefixes: Vec<String>,
    /// Literal tags in a description identifying a light.
    pub light_description_tags: Vec<String>,
    /// Minimum share of the shorter name two related addresses must have in common.
    pub prefix_match_threshold: f32,
}

impl Default for NamingConvention {
    /// German project guidelines with English fallbacks.
    fn default() -> Self {
        Self {
            light_terms: to_set(&[
                "licht",
                "leucht",
                "beleuchtung",
                "lamp",
                "spot",
                "strahl",
                "light",
                "beam",
                "illumination",
            ]),
            status_terms: to_set(&["status", "ruckmeldung", "ruckmeld", "feedback"]),
            light_prefixes: to_vec(&["L_", "LD_", "LDA_"]),
            light_description_tags: to_vec(&["[Licht]", "[Light]"]),
            prefix_match_threshold: DEFAULT_PREFIX_MATCH_THRESHOLD,
        }
    }
}

impl NamingConvention {
    pub fn with_prefix_match_threshold(mut self, threshold: f32) -> Self {
        self.prefix_match_threshold = threshold;
        self
    }

    pub fn contains_light_term(&self, terms: &BTreeSet<String>) -> bool {
        !self.light_terms.is_disjoint(terms)
    }

    pub fn contains_status_term(&self, terms: &BTreeSet<String>) -> bool {
        !self.status_terms.is_disjoint(terms)
    }

    pub fn has_light_prefix(&self, name: &str) -> bool {
        self.light_prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }

    pub fn has_light_tag(&self, description: Option<&str>) -> bool {
        description.is_some_and(|description| {
            self.light_description_tags
                .iter()
                .any(|tag| description.contains(tag.as_str()))
        })
    }
}

fn to_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn to_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
