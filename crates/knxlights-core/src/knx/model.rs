use serde::Serialize;
use std::collections::HashMap;

use crate::knx::address::GroupAddressValue;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            pub const fn index(&self) -> usize {
                self.0
            }
        }
    };
}

entity_id!(
    /// Handle of an [`Area`] inside a [`KnxProject`].
    AreaId
);
entity_id!(
    /// Handle of a [`Line`] inside a [`KnxProject`].
    LineId
);
entity_id!(
    /// Handle of a [`Device`] inside a [`KnxProject`].
    DeviceId
);
entity_id!(
    /// Handle of a [`CommunicationObject`] inside a [`KnxProject`].
    CommunicationObjectId
);
entity_id!(
    /// Handle of a [`GroupAddress`] inside a [`KnxProject`].
    GroupAddressId
);
entity_id!(
    /// Handle of a [`GroupAddressRange`] inside a [`KnxProject`].
    GroupAddressRangeId
);

/// A topology area
#[derive(Debug, Clone)]
pub struct Area {
    pub id: String,
    /// Area address number as string
    pub address: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub lines: Vec<LineId>,
}

/// A line inside an area
#[derive(Debug, Clone)]
pub struct Line {
    pub area: AreaId,
    pub id: String,
    /// Line address number as string
    pub address: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub devices: Vec<DeviceId>,
}

/// A device instance installed on a line
#[derive(Debug, Clone)]
pub struct Device {
    pub line: LineId,
    pub id: String,
    /// Device address local to its line
    pub address: Option<String>,
    /// Individual address "A.L.D", absent unless all three parts are known
    pub physical_address: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub communication_objects: Vec<CommunicationObjectId>,
}

/// A device's binding to group addresses
#[derive(Debug, Clone)]
pub struct CommunicationObject {
    pub device: DeviceId,
    pub ref_id: String,
    /// Canonical `main.sub` datapoint type
    pub datapoint_type: Option<String>,
    pub description: Option<String>,
    pub read_flag: bool,
    pub send_group_address_ref: Option<String>,
    pub listen_group_address_refs: Vec<String>,
    /// Resolved by the linking pass
    pub send_group_address: Option<GroupAddressId>,
    /// Resolved by the linking pass
    pub listen_group_addresses: Vec<GroupAddressId>,
}

impl CommunicationObject {
    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
    }
}

/// A logical bus address
#[derive(Debug, Clone)]
pub struct GroupAddress {
    key: GroupAddressId,
    pub range: Option<GroupAddressRangeId>,
    pub id: String,
    pub address: GroupAddressValue,
    pub name: String,
    pub description: Option<String>,
    /// Canonical `main.sub` datapoint type
    pub datapoint_type: Option<String>,
    /// Communication objects sending on this address (filled by linking)
    pub writing_communication_objects: Vec<CommunicationObjectId>,
    /// Communication objects listening on this address (filled by linking)
    pub listening_communication_objects: Vec<CommunicationObjectId>,
}

impl GroupAddress {
    /// Handle of this address inside its project.
    pub fn key(&self) -> GroupAddressId {
        self.key
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl std::fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}, dpt={}]",
            self.address,
            self.name,
            self.datapoint_type.as_deref().unwrap_or("-")
        )
    }
}

/// A named bucket in the group address catalog
#[derive(Debug, Clone)]
pub struct GroupAddressRange {
    pub parent: Option<GroupAddressRangeId>,
    pub id: String,
    pub start: u16,
    pub end: u16,
    pub name: String,
    pub description: Option<String>,
}

impl GroupAddressRange {
    pub fn start_address(&self) -> GroupAddressValue {
        GroupAddressValue::new(self.start)
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

/// Joins area, line and device address into an individual address.
pub fn format_physical_address(
    area: Option<&str>,
    line: Option<&str>,
    device: Option<&str>,
) -> Option<String> {
    fn part(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|value| !value.is_empty())
    }
    match (part(area), part(line), part(device)) {
        (Some(a), Some(l), Some(d)) => Some(format!("{}.{}.{}", a, l, d)),
        _ => None,
    }
}

/// The entity graph of one exported project.
///
/// Entities live in flat tables and refer to each other by handle. Group
/// address references of communication objects stay unresolved until
/// [`crate::knx::linker::link_group_addresses`] ran.
#[derive(Debug, Clone, Default)]
pub struct KnxProject {
    pub id: String,
    pub name: String,
    pub(crate) areas: Vec<Area>,
    pub(crate) lines: Vec<Line>,
    pub(crate) devices: Vec<Device>,
    pub(crate) communication_objects: Vec<CommunicationObject>,
    pub(crate) group_addresses: Vec<GroupAddress>,
    pub(crate) group_address_ranges: Vec<GroupAddressRange>,
    group_address_by_id: HashMap<String, GroupAddressId>,
}

impl KnxProject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn communication_objects(&self) -> &[CommunicationObject] {
        &self.communication_objects
    }

    pub fn group_addresses(&self) -> &[GroupAddress] {
        &self.group_addresses
    }

    pub fn group_address_ranges(&self) -> &[GroupAddressRange] {
        &self.group_address_ranges
    }

    pub fn area(&self, id: AreaId) -> &Area {
        &self.areas[id.0]
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.0]
    }

    pub fn device(&self, id: DeviceId) -> &Device {
        &self.devices[id.0]
    }

    pub fn communication_object(&self, id: CommunicationObjectId) -> &CommunicationObject {
        &self.communication_objects[id.0]
    }

    pub fn group_address(&self, id: GroupAddressId) -> &GroupAddress {
        &self.group_addresses[id.0]
    }

    pub fn group_address_mut(&mut self, id: GroupAddressId) -> &mut GroupAddress {
        &mut self.group_addresses[id.0]
    }

    pub fn group_address_range(&self, id: GroupAddressRangeId) -> &GroupAddressRange {
        &self.group_address_ranges[id.0]
    }

    /// Looks up a group address by its document id.
    pub fn find_group_address(&self, id: &str) -> Option<GroupAddressId> {
        self.group_address_by_id.get(id).copied()
    }

    pub fn add_area(
        &mut self,
        id: impl Into<String>,
        address: Option<String>,
        name: Option<String>,
        description: Option<String>,
    ) -> AreaId {
        let key = AreaId(self.areas.len());
        self.areas.push(Area {
            id: id.into(),
            address,
            name,
            description,
            lines: Vec::new(),
        });
        key
    }

    pub fn add_line(
        &mut self,
        area: AreaId,
        id: impl Into<String>,
        address: Option<String>,
        name: Option<String>,
        description: Option<String>,
    ) -> LineId {
        let key = LineId(self.lines.len());
        self.lines.push(Line {
            area,
            id: id.into(),
            address,
            name,
            description,
            devices: Vec::new(),
        });
        self.areas[area.0].lines.push(key);
        key
    }

    pub fn add_device(
        &mut self,
        line: LineId,
        id: impl Into<String>,
        address: Option<String>,
        name: Option<String>,
        description: Option<String>,
    ) -> DeviceId {
        let line_entity = &self.lines[line.0];
        let physical_address = format_physical_address(
            self.areas[line_entity.area.0].address.as_deref(),
            line_entity.address.as_deref(),
            address.as_deref(),
        );
        let key = DeviceId(self.devices.len());
        self.devices.push(Device {
            line,
            id: id.into(),
            address,
            physical_address,
            name,
            description,
            communication_objects: Vec::new(),
        });
        self.lines[line.0].devices.push(key);
        key
    }

    pub fn add_communication_object(
        &mut self,
        device: DeviceId,
        ref_id: impl Into<String>,
        datapoint_type: Option<String>,
        description: Option<String>,
        read_flag: bool,
    ) -> CommunicationObjectId {
        let key = CommunicationObjectId(self.communication_objects.len());
        self.communication_objects.push(CommunicationObject {
            device,
            ref_id: ref_id.into(),
            datapoint_type,
            description,
            read_flag,
            send_group_address_ref: None,
            listen_group_address_refs: Vec::new(),
            send_group_address: None,
            listen_group_addresses: Vec::new(),
        });
        self.devices[device.0].communication_objects.push(key);
        key
    }

    pub fn set_send_group_address_ref(&mut self, object: CommunicationObjectId, ref_id: String) {
        self.communication_objects[object.0].send_group_address_ref = Some(ref_id);
    }

    pub fn add_listen_group_address_ref(&mut self, object: CommunicationObjectId, ref_id: String) {
        self.communication_objects[object.0]
            .listen_group_address_refs
            .push(ref_id);
    }

    pub fn add_group_address_range(
        &mut self,
        parent: Option<GroupAddressRangeId>,
        id: impl Into<String>,
        start: u16,
        end: u16,
        name: impl Into<String>,
        description: Option<String>,
    ) -> GroupAddressRangeId {
        let key = GroupAddressRangeId(self.group_address_ranges.len());
        self.group_address_ranges.push(GroupAddressRange {
            parent,
            id: id.into(),
            start,
            end,
            name: name.into(),
            description,
        });
        key
    }

    pub fn add_group_address(
        &mut self,
        range: Option<GroupAddressRangeId>,
        id: impl Into<String>,
        address: GroupAddressValue,
        name: impl Into<String>,
        description: Option<String>,
        datapoint_type: Option<String>,
    ) -> GroupAddressId {
        let id = id.into();
        let entity = |key| GroupAddress {
            key,
            range,
            id: id.clone(),
            address,
            name: name.into(),
            description,
            datapoint_type,
            writing_communication_objects: Vec::new(),
            listening_communication_objects: Vec::new(),
        };
        if let Some(&previous) = self.group_address_by_id.get(&id) {
            log::warn!(
                "Group address id {} declared twice, replacing {}",
                id,
                self.group_addresses[previous.0]
            );
            self.group_addresses[previous.0] = entity(previous);
            return previous;
        }
        let key = GroupAddressId(self.group_addresses.len());
        self.group_addresses.push(entity(key));
        self.group_address_by_id.insert(id, key);
        key
    }

    /// Walks from the range of `ga` up to the top-level range.
    pub fn range_chain(&self, ga: &GroupAddress) -> impl Iterator<Item = GroupAddressRangeId> + '_ {
        std::iter::successors(ga.range, move |range| self.group_address_ranges[range.0].parent)
    }
}
