use std::fmt;

use knxlights_core::{Fixture, GroupAddressId, KnxProject};
use serde::Serialize;

/// Fixtures of one project with group addresses spelled out as `main/middle/sub`.
#[derive(Debug, Serialize)]
pub struct Report {
    pub project_id: String,
    pub project_name: String,
    pub fixtures: Vec<FixtureReport>,
}

#[derive(Debug, Serialize)]
pub struct FixtureReport {
    pub kind: &'static str,
    pub name: String,
    pub switch: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness_status: Option<String>,
}

impl Report {
    pub fn new(project: &KnxProject, fixtures: &[Fixture]) -> Self {
        let address = |id: GroupAddressId| project.group_address(id).address.to_string();
        let fixtures = fixtures
            .iter()
            .map(|fixture| match fixture {
                Fixture::Light(light) => FixtureReport {
                    kind: "light",
                    name: light.name.clone(),
                    switch: address(light.switch),
                    status: address(light.status),
                    dim: None,
                    brightness: None,
                    brightness_status: None,
                },
                Fixture::DimmableLight(light) => FixtureReport {
                    kind: "dimmable_light",
                    name: light.name.clone(),
                    switch: address(light.switch),
                    status: address(light.status),
                    dim: Some(address(light.dim)),
                    brightness: Some(address(light.brightness)),
                    brightness_status: Some(address(light.brightness_status)),
                },
            })
            .collect();

        Self {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            fixtures,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({}): {} fixtures",
            self.project_name,
            self.project_id,
            self.fixtures.len()
        )?;
        for fixture in &self.fixtures {
            write!(
                f,
                "{:<14} {:<32} switch={} status={}",
                fixture.kind, fixture.name, fixture.switch, fixture.status
            )?;
            if let (Some(dim), Some(brightness), Some(brightness_status)) =
                (&fixture.dim, &fixture.brightness, &fixture.brightness_status)
            {
                write!(
                    f,
                    " dim={} brightness={} brightness_status={}",
                    dim, brightness, brightness_status
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
