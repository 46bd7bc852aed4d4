use crate::knx::dpt::DatapointType;
use crate::knx::model::{GroupAddress, GroupAddressId, KnxProject};

/// Patterns found within a KNX project.
///
/// Implementations hold per-project state (a search index built by
/// [`learn`](Self::learn)), so a fresh instance is needed for every project
/// analysed. Query methods are pure functions of that state and return
/// `false`/`None` when nothing was learned yet.
pub trait KnxProjectCharacteristics: Send + Sync {
    /// Indexes every group address of `project`. Learning the same project
    /// again replaces the previous index entries.
    fn learn(&mut self, project: &KnxProject);

    /// Completes a group address from the communication objects writing to it.
    ///
    /// Returns the number of inconsistencies found.
    fn fill_in_missing_information(&self, project: &mut KnxProject, ga: GroupAddressId) -> usize {
        fill_in_from_communication_objects(project, ga)
    }

    /// Whether `ga` is related to lighting (switching, dimming, status).
    fn is_light(&self, ga: &GroupAddress) -> bool;

    /// Whether `ga` is the main on/off address of a fixture.
    fn is_primary_switch(&self, ga: &GroupAddress) -> bool {
        has_primary_switch_type(ga)
    }

    fn find_matching_status_group_address(&self, primary: &GroupAddress) -> Option<GroupAddressId>;

    fn find_matching_dim_group_address(&self, primary: &GroupAddress) -> Option<GroupAddressId>;

    fn find_matching_brightness_group_address(&self, primary: &GroupAddress) -> Option<GroupAddressId>;

    fn find_matching_brightness_status_group_address(
        &self,
        primary: &GroupAddress,
    ) -> Option<GroupAddressId>;

    /// Name shared by `primary` and all `related` addresses.
    fn find_name(&self, primary: &GroupAddress, related: &[&GroupAddress]) -> String;
}

/// Switching, up/down and open/close addresses can drive a fixture.
pub fn has_primary_switch_type(ga: &GroupAddress) -> bool {
    matches!(
        ga.datapoint_type.as_deref().and_then(DatapointType::from_code),
        Some(DatapointType::Switch | DatapointType::UpDown | DatapointType::OpenClose)
    )
}

/// Copies datapoint type and name from the writing communication objects.
pub fn fill_in_from_communication_objects(project: &mut KnxProject, ga: GroupAddressId) -> usize {
    let mut warnings = 0;
    let mut datapoint_type = project.group_address(ga).datapoint_type.clone();
    let mut name_from_object = None;

    for &object in &project.group_address(ga).writing_communication_objects {
        let object = project.communication_object(object);
        match (&object.datapoint_type, &datapoint_type) {
            (Some(object_type), None) => {
                log::debug!(
                    "Update DPT to {} based on CO {} for GA {}",
                    object_type,
                    object.ref_id,
                    project.group_address(ga)
                );
                datapoint_type = Some(object_type.clone());
            }
            (Some(object_type), Some(expected)) if object_type != expected => {
                log::warn!(
                    "Found communication object {} with DPT {} which differs from expected {} for GA {}",
                    object.ref_id,
                    object_type,
                    expected,
                    project.group_address(ga)
                );
                warnings += 1;
            }
            (Some(_), Some(_)) => {}
            (None, _) => {
                log::warn!(
                    "Found communication object {} without DPT for GA {}",
                    object.ref_id,
                    project.group_address(ga)
                );
                warnings += 1;
            }
        }
        if name_from_object.is_none() && object.has_description() {
            name_from_object = object.description.clone();
        }
    }

    let entity = project.group_address_mut(ga);
    entity.datapoint_type = datapoint_type;
    if !entity.has_name() {
        let fallback = name_from_object.or_else(|| {
            entity
                .description
                .clone()
                .filter(|description| !description.trim().is_empty())
        });
        if let Some(name) = fallback {
            log::debug!("Update name of GA {} to '{}'", entity.address, name);
            entity.name = name;
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knx::address::GroupAddressValue;
    use crate::knx::linker::link_group_addresses;

    fn project_with_writers(
        ga_type: Option<&str>,
        name: &str,
        description: Option<&str>,
        writers: &[(Option<&str>, Option<&str>)],
    ) -> (KnxProject, GroupAddressId) {
        let mut project = KnxProject::new("P-0001", "Test");
        let ga = project.add_group_address(
            None,
            "GA-1",
            GroupAddressValue::new(2049),
            name,
            description.map(str::to_string),
            ga_type.map(str::to_string),
        );
        let area = project.add_area("A-1", Some("1".into()), None, None);
        let line = project.add_line(area, "L-1", Some("1".into()), None, None);
        let device = project.add_device(line, "D-1", Some("1".into()), None, None);
        for (index, (object_type, object_description)) in writers.iter().enumerate() {
            let object = project.add_communication_object(
                device,
                format!("O-{}", index),
                object_type.map(str::to_string),
                object_description.map(str::to_string),
                false,
            );
            project.set_send_group_address_ref(object, "GA-1".into());
        }
        link_group_addresses(&mut project);
        (project, ga)
    }

    #[test]
    fn copies_type_from_first_writer() {
        let (mut project, ga) =
            project_with_writers(None, "Licht", None, &[(Some("1.001"), None), (Some("1.001"), None)]);
        assert_eq!(fill_in_from_communication_objects(&mut project, ga), 0);
        assert_eq!(project.group_address(ga).datapoint_type.as_deref(), Some("1.001"));
    }

    #[test]
    fn counts_conflicting_and_missing_types() {
        let (mut project, ga) = project_with_writers(
            Some("1.001"),
            "Licht",
            None,
            &[(Some("5.001"), None), (None, None), (Some("1.001"), None)],
        );
        assert_eq!(fill_in_from_communication_objects(&mut project, ga), 2);
        assert_eq!(project.group_address(ga).datapoint_type.as_deref(), Some("1.001"));
    }

    #[test]
    fn blank_name_taken_from_first_described_writer() {
        let (mut project, ga) = project_with_writers(
            Some("1.001"),
            "  ",
            Some("GA Beschreibung"),
            &[(Some("1.001"), Some(" ")), (Some("1.001"), Some("Licht Flur")), (Some("1.001"), Some("Licht Bad"))],
        );
        fill_in_from_communication_objects(&mut project, ga);
        assert_eq!(project.group_address(ga).name, "Licht Flur");
    }

    #[test]
    fn blank_name_falls_back_to_description() {
        let (mut project, ga) = project_with_writers(Some("1.001"), "", Some("Licht Keller"), &[]);
        assert_eq!(fill_in_from_communication_objects(&mut project, ga), 0);
        assert_eq!(project.group_address(ga).name, "Licht Keller");

        let (mut project, ga) = project_with_writers(Some("1.001"), "", None, &[]);
        fill_in_from_communication_objects(&mut project, ga);
        assert_eq!(project.group_address(ga).name, "");
    }

    #[test]
    fn primary_switch_types() {
        let mut project = KnxProject::new("P-0001", "Test");
        for (index, (dpt, expected)) in [
            (Some("1.001"), true),
            (Some("1.008"), true),
            (Some("1.009"), true),
            (Some("1.011"), false),
            (Some("5.001"), false),
            (Some("0.000"), false),
            (None, false),
        ]
        .into_iter()
        .enumerate()
        {
            let ga = project.add_group_address(
                None,
                format!("GA-{}", index),
                GroupAddressValue::new(index as u16),
                "Licht",
                None,
                dpt.map(str::to_string),
            );
            assert_eq!(has_primary_switch_type(project.group_address(ga)), expected, "{:?}", dpt);
        }
    }
}
