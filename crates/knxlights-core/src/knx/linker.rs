use std::collections::HashMap;

use rayon::prelude::*;

use crate::knx::model::{CommunicationObjectId, GroupAddressId, KnxProject};

struct ResolvedLinks {
    object: CommunicationObjectId,
    send: Option<GroupAddressId>,
    listen: Vec<GroupAddressId>,
}

/// Connects communication objects and group addresses in both directions.
///
/// References are resolved per device in parallel against the read-only
/// project, then merged into the group addresses in device order. Running
/// it again does not add duplicate associations.
pub fn link_group_addresses(project: &mut KnxProject) {
    log::debug!("Connecting devices and GAs");

    let resolved: Vec<Vec<ResolvedLinks>> = {
        let project = &*project;
        let short_ids = short_id_index(project);
        project
            .devices
            .par_iter()
            .map(|device| {
                device
                    .communication_objects
                    .iter()
                    .map(|&object| resolve_object(project, &short_ids, object))
                    .collect()
            })
            .collect()
    };

    for links in resolved.into_iter().flatten() {
        let ResolvedLinks { object, send, listen } = links;

        if let Some(ga) = send {
            project.communication_objects[object.index()].send_group_address = Some(ga);
            push_unique(
                &mut project.group_addresses[ga.index()].writing_communication_objects,
                object,
            );
        }
        for ga in listen {
            push_unique(
                &mut project.communication_objects[object.index()].listen_group_addresses,
                ga,
            );
            push_unique(
                &mut project.group_addresses[ga.index()].listening_communication_objects,
                object,
            );
        }
    }

    log::debug!(
        "Found {} devices and {} GAs",
        project.devices.len(),
        project.group_addresses.len()
    );
}

fn resolve_object(
    project: &KnxProject,
    short_ids: &HashMap<&str, Option<GroupAddressId>>,
    object: CommunicationObjectId,
) -> ResolvedLinks {
    let entity = project.communication_object(object);
    let resolve = |ref_id: &str| {
        let found = project
            .find_group_address(ref_id)
            .or_else(|| short_ids.get(short_id(ref_id)).copied().flatten());
        if found.is_none() {
            log::warn!(
                "Communication object {} refers to unknown group address {}",
                entity.ref_id,
                ref_id
            );
        }
        found
    };

    ResolvedLinks {
        object,
        send: entity.send_group_address_ref.as_deref().and_then(resolve),
        listen: entity
            .listen_group_address_refs
            .iter()
            .filter_map(|ref_id| resolve(ref_id))
            .collect(),
    }
}

/// Maps `GA-1` style ids to their group address; ambiguous short ids map to `None`.
fn short_id_index(project: &KnxProject) -> HashMap<&str, Option<GroupAddressId>> {
    let mut index: HashMap<&str, Option<GroupAddressId>> = HashMap::new();
    for ga in &project.group_addresses {
        index
            .entry(short_id(&ga.id))
            .and_modify(|existing| *existing = None)
            .or_insert(Some(ga.key()));
    }
    index
}

fn short_id(full_id: &str) -> &str {
    full_id.rsplit('_').next().unwrap_or(full_id)
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}
