use rayon::prelude::*;
use serde::Serialize;

use crate::error::{KnxError, Result};
use crate::knx::model::{GroupAddress, GroupAddressId, KnxProject};
use crate::semantic::characteristics::KnxProjectCharacteristics;
use crate::semantic::fixtures::{DimmableLight, Fixture, Light};
use crate::semantic::heuristic::HeuristicCharacteristics;

pub const DEFAULT_WARNING_RATIO_THRESHOLD: f32 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisState {
    Unanalyzed,
    FillingGaps,
    QualityGate,
    Indexed,
    Classifying,
    Grouping,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    /// Share of group addresses with data-quality warnings above which the
    /// project is reported as poorly maintained.
    pub warning_ratio_threshold: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            warning_ratio_threshold: DEFAULT_WARNING_RATIO_THRESHOLD,
        }
    }
}

/// Finds the light fixtures of one project.
///
/// The analyzer owns the project because completing missing information
/// mutates its group addresses.
pub struct KnxProjectAnalyzer<C: KnxProjectCharacteristics = HeuristicCharacteristics> {
    project: KnxProject,
    characteristics: C,
    config: AnalyzerConfig,
    state: AnalysisState,
    warnings: usize,
    fixtures: Vec<Fixture>,
}

impl KnxProjectAnalyzer<HeuristicCharacteristics> {
    pub fn with_default_characteristics(project: KnxProject) -> Self {
        Self::new(project, HeuristicCharacteristics::default())
    }
}

impl<C: KnxProjectCharacteristics> KnxProjectAnalyzer<C> {
    pub fn new(project: KnxProject, characteristics: C) -> Self {
        Self {
            project,
            characteristics,
            config: AnalyzerConfig::default(),
            state: AnalysisState::Unanalyzed,
            warnings: 0,
            fixtures: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Data-quality warnings found while completing the group addresses.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn project(&self) -> &KnxProject {
        &self.project
    }

    pub fn characteristics(&self) -> &C {
        &self.characteristics
    }

    pub fn into_parts(self) -> (KnxProject, Vec<Fixture>) {
        (self.project, self.fixtures)
    }

    /// Runs the analysis once. Later calls return the first outcome.
    pub fn analyze(&mut self) -> Result<&[Fixture]> {
        match self.state {
            AnalysisState::Unanalyzed => {}
            AnalysisState::Failed => return Err(KnxError::EmptyProject),
            _ => return Ok(&self.fixtures),
        }

        let total = self.project.group_addresses().len();
        if total == 0 {
            self.state = AnalysisState::Failed;
            return Err(KnxError::EmptyProject);
        }

        self.state = AnalysisState::FillingGaps;
        let ids: Vec<GroupAddressId> = self.project.group_addresses().iter().map(GroupAddress::key).collect();
        for id in ids {
            self.warnings += self
                .characteristics
                .fill_in_missing_information(&mut self.project, id);
        }

        self.state = AnalysisState::QualityGate;
        let ratio = self.warnings as f32 / total as f32;
        if ratio > self.config.warning_ratio_threshold {
            log::warn!(
                "The project data generated a lot of warnings ({} for {} GAs). Please consider improving the ETS data.",
                self.warnings,
                total
            );
        }

        self.state = AnalysisState::Indexed;
        self.characteristics.learn(&self.project);

        self.state = AnalysisState::Classifying;
        let characteristics = &self.characteristics;
        let lights: Vec<&GroupAddress> = self
            .project
            .group_addresses()
            .par_iter()
            .filter(|ga| characteristics.is_light(ga))
            .collect();
        let primaries: Vec<&GroupAddress> = lights
            .par_iter()
            .copied()
            .filter(|ga| characteristics.is_primary_switch(ga))
            .collect();
        log::info!(
            "Found {} light GAs, {} of them primary switches",
            lights.len(),
            primaries.len()
        );

        self.state = AnalysisState::Grouping;
        let fixtures: Vec<Fixture> = primaries
            .into_iter()
            .filter_map(|ga| analyze_light(characteristics, &self.project, ga))
            .collect();
        self.fixtures = fixtures;

        self.state = AnalysisState::Done;
        log::info!("Found {} lights", self.fixtures.len());
        Ok(&self.fixtures)
    }
}

fn analyze_light<C: KnxProjectCharacteristics>(
    characteristics: &C,
    project: &KnxProject,
    ga: &GroupAddress,
) -> Option<Fixture> {
    let Some(status) = characteristics.find_matching_status_group_address(ga) else {
        log::debug!("Unable to find matching status GA for GA {}", ga);
        return None;
    };
    let status_ga = project.group_address(status);

    let dim = characteristics.find_matching_dim_group_address(ga);
    let brightness = characteristics.find_matching_brightness_group_address(ga);
    let brightness_status = characteristics.find_matching_brightness_status_group_address(ga);

    let fixture = match (dim, brightness, brightness_status) {
        (Some(dim), Some(brightness), Some(brightness_status)) => {
            let name = characteristics.find_name(
                ga,
                &[
                    status_ga,
                    project.group_address(dim),
                    project.group_address(brightness),
                    project.group_address(brightness_status),
                ],
            );
            Fixture::DimmableLight(DimmableLight {
                name,
                switch: ga.key(),
                status,
                dim,
                brightness,
                brightness_status,
            })
        }
        _ => Fixture::Light(Light {
            name: characteristics.find_name(ga, &[status_ga]),
            switch: ga.key(),
            status,
        }),
    };
    log::debug!("Found {} for GA {}", fixture.name(), ga);
    Some(fixture)
}
