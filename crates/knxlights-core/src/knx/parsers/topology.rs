use std::io::BufRead;

use crate::error::ParseError;
use crate::knx::dpt::decode_datapoint_type;
use crate::knx::model::{AreaId, CommunicationObjectId, DeviceId, KnxProject, LineId};
use crate::knx::xml_cursor::XmlCursor;
use crate::knx::xml_tags;

const READ_FLAG_ENABLED: &str = "Enabled";

/// Reads `Topology` into areas, lines, devices and communication objects.
pub(crate) fn read_topology<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
) -> Result<(), ParseError> {
    cursor.read_children(|cursor, name| {
        if name == xml_tags::AREA {
            read_area(cursor, project)?;
        }
        Ok(())
    })
}

fn read_area<R: BufRead>(cursor: &mut XmlCursor<R>, project: &mut KnxProject) -> Result<(), ParseError> {
    let area = project.add_area(
        cursor.attribute("Id").unwrap_or_default(),
        cursor.attribute("Address"),
        cursor.attribute("Name"),
        cursor.attribute("Description"),
    );
    log::debug!("Found area: {}", project.area(area).id);

    cursor.read_children(|cursor, name| {
        if name == xml_tags::LINE {
            read_line(cursor, project, area)?;
        }
        Ok(())
    })
}

fn read_line<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
    area: AreaId,
) -> Result<(), ParseError> {
    let line = project.add_line(
        area,
        cursor.attribute("Id").unwrap_or_default(),
        cursor.attribute("Address"),
        cursor.attribute("Name"),
        cursor.attribute("Description"),
    );
    log::debug!("Found line: {}", project.line(line).id);

    cursor.read_children(|cursor, name| {
        match name {
            xml_tags::DEVICE_INSTANCE => read_device(cursor, project, line)?,
            // ETS 6 puts devices below the line's segments
            xml_tags::SEGMENT => cursor.read_children(|cursor, name| {
                if name == xml_tags::DEVICE_INSTANCE {
                    read_device(cursor, project, line)?;
                }
                Ok(())
            })?,
            _ => {}
        }
        Ok(())
    })
}

fn read_device<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
    line: LineId,
) -> Result<(), ParseError> {
    let device = project.add_device(
        line,
        cursor.attribute("Id").unwrap_or_default(),
        cursor.attribute("Address"),
        cursor.attribute("Name"),
        cursor.attribute("Description"),
    );
    let entity = project.device(device);
    log::debug!(
        "Found device: {} ({})",
        entity.id,
        entity.physical_address.as_deref().unwrap_or("-")
    );

    cursor.read_children(|cursor, name| {
        match name {
            xml_tags::COM_OBJECT_INSTANCE_REFS => cursor.read_children(|cursor, name| {
                if name == xml_tags::COM_OBJECT_INSTANCE_REF {
                    read_com_object(cursor, project, device)?;
                }
                Ok(())
            })?,
            xml_tags::COM_OBJECT_INSTANCE_REF => read_com_object(cursor, project, device)?,
            _ => {}
        }
        Ok(())
    })
}

fn read_com_object<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
    device: DeviceId,
) -> Result<(), ParseError> {
    let location = cursor.location();
    let datapoint_type = decode_datapoint_type(cursor.attribute("DatapointType").as_deref(), &location);
    let object = project.add_communication_object(
        device,
        cursor.attribute("RefId").unwrap_or_default(),
        datapoint_type,
        cursor.attribute("Description"),
        cursor.attribute("ReadFlag").as_deref() == Some(READ_FLAG_ENABLED),
    );

    if let Some(links) = cursor.attribute("Links") {
        apply_links(project, object, &links);
    }

    cursor.read_children(|cursor, name| {
        if name == xml_tags::CONNECTORS {
            read_connectors(cursor, project, object)?;
        }
        Ok(())
    })
}

fn read_connectors<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
    object: CommunicationObjectId,
) -> Result<(), ParseError> {
    cursor.read_children(|cursor, name| {
        let Some(ref_id) = cursor.attribute("GroupAddressRefId") else {
            return Ok(());
        };
        match name {
            xml_tags::SEND => project.set_send_group_address_ref(object, ref_id),
            xml_tags::RECEIVE => project.add_listen_group_address_ref(object, ref_id),
            _ => {}
        }
        Ok(())
    })
}

/// `Links` lists the sending address first, every further entry is listened to.
fn apply_links(project: &mut KnxProject, object: CommunicationObjectId, links: &str) {
    let mut links = links
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|value| !value.is_empty());
    if let Some(send) = links.next() {
        project.set_send_group_address_ref(object, send.to_string());
    }
    for listen in links {
        project.add_listen_group_address_ref(object, listen.to_string());
    }
}
