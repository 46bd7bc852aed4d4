use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::knx::address::GroupAddressValue;
use crate::knx::dpt::DatapointType;
use crate::knx::model::{GroupAddress, GroupAddressId, GroupAddressRangeId, KnxProject};
use crate::semantic::characteristics::{has_primary_switch_type, KnxProjectCharacteristics};
use crate::semantic::convention::NamingConvention;
use crate::semantic::text::TextAnalyzer;

/// Addresses allocated per dimmable light: on/off, dim, brightness, status, brightness status.
const BLOCK_LENGTH: u16 = 5;
const DIM_OFFSET: u16 = 1;
const BRIGHTNESS_OFFSET: u16 = 2;
const STATUS_OFFSET: u16 = 3;
const BRIGHTNESS_STATUS_OFFSET: u16 = 4;

#[derive(Debug, Clone)]
struct IndexedGroupAddress {
    name: String,
    datapoint_type: Option<String>,
    terms: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct IndexedRange {
    start: GroupAddressValue,
    top_level: bool,
    terms: BTreeSet<String>,
}

/// Classifies group addresses by their names, following the KNX project
/// guidelines ("Projektrichtlinien") on naming and address allocation.
#[derive(Debug, Clone)]
pub struct HeuristicCharacteristics {
    convention: NamingConvention,
    analyzer: TextAnalyzer,
    group_addresses: HashMap<GroupAddressId, IndexedGroupAddress>,
    ranges: BTreeMap<GroupAddressRangeId, IndexedRange>,
    by_address: HashMap<GroupAddressValue, GroupAddressId>,
}

impl Default for HeuristicCharacteristics {
    fn default() -> Self {
        Self::new(NamingConvention::default())
    }
}

impl HeuristicCharacteristics {
    pub fn new(convention: NamingConvention) -> Self {
        Self::with_analyzer(convention, TextAnalyzer::default())
    }

    pub fn with_analyzer(convention: NamingConvention, analyzer: TextAnalyzer) -> Self {
        Self {
            convention,
            analyzer,
            group_addresses: HashMap::new(),
            ranges: BTreeMap::new(),
            by_address: HashMap::new(),
        }
    }

    pub fn convention(&self) -> &NamingConvention {
        &self.convention
    }

    /// Indexed terms of a group address name.
    pub fn name_terms(&self, ga: GroupAddressId) -> Option<&BTreeSet<String>> {
        self.group_addresses.get(&ga).map(|indexed| &indexed.terms)
    }

    /// Length of the common leading run of both names relative to the shorter one.
    pub fn prefix_match_ratio(candidate: &str, primary: &str) -> f32 {
        let min_length = candidate.chars().count().min(primary.chars().count());
        if min_length == 0 {
            return 0.0;
        }
        let common = candidate
            .chars()
            .zip(primary.chars())
            .take_while(|(a, b)| a == b)
            .count();
        common as f32 / min_length as f32
    }

    fn is_match_on_name(&self, candidate: &IndexedGroupAddress, primary: &GroupAddress) -> bool {
        let ratio = Self::prefix_match_ratio(&candidate.name, &primary.name);
        if ratio < self.convention.prefix_match_threshold {
            log::debug!(
                "Prefix mismatch for candidate '{}' comparing to primary {} (match {:.2})",
                candidate.name,
                primary,
                ratio
            );
            return false;
        }
        true
    }

    fn is_match_on_name_and_type(
        &self,
        candidate: &IndexedGroupAddress,
        primary: &GroupAddress,
        expected: DatapointType,
    ) -> bool {
        if !self.is_match_on_name(candidate, primary) {
            return false;
        }
        match candidate.datapoint_type.as_deref().map(str::trim) {
            None | Some("") => {
                log::warn!("Accepting candidate '{}' with missing DPT", candidate.name);
                true
            }
            Some(code) => DatapointType::from_code(code) == Some(expected),
        }
    }

    fn lookup(&self, address: GroupAddressValue) -> Option<(GroupAddressId, &IndexedGroupAddress)> {
        let id = *self.by_address.get(&address)?;
        self.group_addresses.get(&id).map(|indexed| (id, indexed))
    }

    fn block_member(
        &self,
        primary: &GroupAddress,
        offset: u16,
        expected: DatapointType,
    ) -> Option<GroupAddressId> {
        let (id, candidate) = self.lookup(primary.address.offset(offset)?)?;
        log::debug!("Evaluating potential candidate for GA {}: {}", primary, candidate.name);
        self.is_match_on_name_and_type(candidate, primary, expected)
            .then_some(id)
    }

    /// Similarly named addresses following `primary` within one block.
    fn block_candidates(&self, primary: &GroupAddress) -> Vec<(GroupAddressId, &IndexedGroupAddress)> {
        let mut block = Vec::new();
        for offset in 1..BLOCK_LENGTH {
            let Some(candidate) = primary
                .address
                .offset(offset)
                .and_then(|address| self.lookup(address))
            else {
                continue;
            };
            if !self.is_match_on_name(candidate.1, primary) {
                log::debug!(
                    "Project doesn't seem to use expected block structure around GA {}",
                    primary
                );
                break;
            }
            block.push(candidate);
        }
        block
    }

    /// Status address following the numbering of a dedicated status range.
    fn status_range_candidate(
        &self,
        range: &IndexedRange,
        primary: &GroupAddress,
    ) -> Option<GroupAddressValue> {
        let address = primary.address;
        if range.top_level {
            GroupAddressValue::from_parts(range.start.main(), address.middle(), address.sub())
        } else {
            GroupAddressValue::from_parts(address.main(), range.start.middle(), address.sub())
        }
    }
}

impl KnxProjectCharacteristics for HeuristicCharacteristics {
    fn learn(&mut self, project: &KnxProject) {
        let mut ranges_seen = HashSet::new();
        for ga in project.group_addresses() {
            self.group_addresses.insert(
                ga.key(),
                IndexedGroupAddress {
                    name: ga.name.clone(),
                    datapoint_type: ga.datapoint_type.clone(),
                    terms: self.analyzer.terms(&ga.name),
                },
            );
            if let Some(previous) = self.by_address.insert(ga.address, ga.key()) {
                if previous != ga.key() {
                    log::warn!("Group address {} is used more than once", ga.address);
                }
            }

            for range_id in project.range_chain(ga) {
                if !ranges_seen.insert(range_id) {
                    break;
                }
                let range = project.group_address_range(range_id);
                self.ranges.insert(
                    range_id,
                    IndexedRange {
                        start: range.start_address(),
                        top_level: range.is_top_level(),
                        terms: self.analyzer.terms(&range.name),
                    },
                );
            }
        }
        log::debug!(
            "Indexed {} GAs and {} ranges",
            self.group_addresses.len(),
            self.ranges.len()
        );
    }

    fn is_light(&self, ga: &GroupAddress) -> bool {
        if !ga.has_name() {
            log::warn!("GA with blank name should be fixed: {}", ga);
            return false;
        }
        let Some(indexed) = self.group_addresses.get(&ga.key()) else {
            log::warn!("No index available for GA: {}", ga);
            return false;
        };
        self.convention.contains_light_term(&indexed.terms)
            || self.convention.has_light_prefix(&ga.name)
            || self.convention.has_light_tag(ga.description.as_deref())
    }

    fn is_primary_switch(&self, ga: &GroupAddress) -> bool {
        if !has_primary_switch_type(ga) {
            log::debug!("Not a primary switch GA due to DPT mismatch: {}", ga);
            return false;
        }
        let Some(indexed) = self.group_addresses.get(&ga.key()) else {
            log::warn!("No index available for GA: {}", ga);
            return false;
        };
        !self.convention.contains_status_term(&indexed.terms)
    }

    fn find_matching_status_group_address(&self, primary: &GroupAddress) -> Option<GroupAddressId> {
        let candidates: Vec<GroupAddressId> = self
            .block_candidates(primary)
            .into_iter()
            .filter(|(_, candidate)| {
                candidate.datapoint_type.as_deref().and_then(DatapointType::from_code)
                    == Some(DatapointType::State)
            })
            .map(|(id, _)| id)
            .collect();
        match candidates.as_slice() {
            [single] => {
                log::debug!("Found matching status for GA {} in its block", primary);
                return Some(*single);
            }
            [] => {
                // untyped addresses only count at the status slot
                if let Some(status) = self.block_member(primary, STATUS_OFFSET, DatapointType::State) {
                    log::debug!("Found matching status for GA {} at its block offset", primary);
                    return Some(status);
                }
                log::debug!("No status candidate in the block of GA {}", primary);
            }
            _ => {
                log::warn!(
                    "Project is ambiguous. Found {} status candidates in the block of GA {}",
                    candidates.len(),
                    primary
                );
                return None;
            }
        }

        let candidates: BTreeSet<GroupAddressId> = self
            .ranges
            .values()
            .filter(|range| self.convention.contains_status_term(&range.terms))
            .filter_map(|range| self.status_range_candidate(range, primary))
            .filter_map(|address| self.lookup(address))
            .filter(|(_, candidate)| {
                log::debug!("Evaluating potential candidate for GA {}: {}", primary, candidate.name);
                self.is_match_on_name_and_type(candidate, primary, DatapointType::State)
            })
            .map(|(id, _)| id)
            .collect();
        match candidates.len() {
            0 => None,
            1 => {
                log::debug!("Found matching status for GA {} in a status range", primary);
                candidates.into_iter().next()
            }
            count => {
                log::warn!(
                    "Project is ambiguous. Found {} status candidates in status ranges for GA {}",
                    count,
                    primary
                );
                None
            }
        }
    }

    fn find_matching_dim_group_address(&self, primary: &GroupAddress) -> Option<GroupAddressId> {
        self.block_member(primary, DIM_OFFSET, DatapointType::ControlDimming)
    }

    fn find_matching_brightness_group_address(&self, primary: &GroupAddress) -> Option<GroupAddressId> {
        self.block_member(primary, BRIGHTNESS_OFFSET, DatapointType::Scaling)
    }

    fn find_matching_brightness_status_group_address(
        &self,
        primary: &GroupAddress,
    ) -> Option<GroupAddressId> {
        self.block_member(primary, BRIGHTNESS_STATUS_OFFSET, DatapointType::Scaling)
    }

    fn find_name(&self, primary: &GroupAddress, related: &[&GroupAddress]) -> String {
        let mut name = primary.name.clone();
        loop {
            if name.trim().is_empty() {
                return primary.name.clone();
            }
            if related.iter().all(|ga| ga.name.starts_with(name.as_str())) {
                return name.trim_end().to_string();
            }
            match name.rfind(' ') {
                Some(index) if index > 0 => name.truncate(index),
                _ => {
                    name.pop();
                }
            }
        }
    }
}
