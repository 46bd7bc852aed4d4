use serde::Serialize;

use crate::knx::model::GroupAddressId;

/// A switchable light with confirmed status feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Light {
    pub name: String,
    pub switch: GroupAddressId,
    pub status: GroupAddressId,
}

/// A light that can also be dimmed and set to a brightness level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimmableLight {
    pub name: String,
    pub switch: GroupAddressId,
    pub status: GroupAddressId,
    pub dim: GroupAddressId,
    pub brightness: GroupAddressId,
    pub brightness_status: GroupAddressId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fixture {
    Light(Light),
    DimmableLight(DimmableLight),
}

impl Fixture {
    pub fn name(&self) -> &str {
        match self {
            Fixture::Light(light) => &light.name,
            Fixture::DimmableLight(light) => &light.name,
        }
    }

    pub fn switch(&self) -> GroupAddressId {
        match self {
            Fixture::Light(light) => light.switch,
            Fixture::DimmableLight(light) => light.switch,
        }
    }

    pub fn status(&self) -> GroupAddressId {
        match self {
            Fixture::Light(light) => light.status,
            Fixture::DimmableLight(light) => light.status,
        }
    }

    pub fn is_dimmable(&self) -> bool {
        matches!(self, Fixture::DimmableLight(_))
    }

    /// All addresses of the fixture, primary switch first.
    pub fn group_addresses(&self) -> Vec<GroupAddressId> {
        match self {
            Fixture::Light(light) => vec![light.switch, light.status],
            Fixture::DimmableLight(light) => vec![
                light.switch,
                light.status,
                light.dim,
                light.brightness,
                light.brightness_status,
            ],
        }
    }
}
