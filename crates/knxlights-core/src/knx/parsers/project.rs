use std::io::BufRead;

use crate::error::ParseError;
use crate::knx::model::KnxProject;
use crate::knx::parsers::group_addresses::read_group_addresses;
use crate::knx::parsers::topology::read_topology;
use crate::knx::xml_cursor::XmlCursor;
use crate::knx::xml_tags;

/// Reads the project's display name from `project.xml`.
///
/// Stops as soon as `ProjectInformation` was seen, the rest of the document
/// is never read.
pub(crate) fn read_project_info<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project_id: &str,
) -> Result<String, ParseError> {
    loop {
        cursor.advance()?;
        match cursor.start_name() {
            Some(xml_tags::PROJECT) => verify_project_id(cursor, project_id)?,
            Some(xml_tags::PROJECT_INFORMATION) => {
                let name = cursor.required_attribute("Name")?;
                log::debug!("Found project name: {}", name);
                return Ok(name);
            }
            _ if cursor.is_eof() => {
                log::warn!("No project information found in {}", cursor.location());
                return Err(ParseError::UnexpectedEnd {
                    location: cursor.location(),
                });
            }
            _ => {}
        }
    }
}

/// Reads topology and group address catalog from `0.xml` into `project`.
pub(crate) fn read_project_data<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
) -> Result<(), ParseError> {
    loop {
        cursor.advance()?;
        match cursor.start_name() {
            Some(xml_tags::PROJECT) => verify_project_id(cursor, &project.id)?,
            Some(xml_tags::TOPOLOGY) => read_topology(cursor, project)?,
            Some(xml_tags::GROUP_ADDRESSES) => read_group_addresses(cursor, project)?,
            _ if cursor.is_eof() => return Ok(()),
            _ => {}
        }
    }
}

fn verify_project_id<R: BufRead>(cursor: &XmlCursor<R>, expected: &str) -> Result<(), ParseError> {
    let declared = cursor.required_attribute("Id")?;
    if declared != expected {
        return Err(ParseError::ProjectIdMismatch {
            declared,
            expected: expected.to_string(),
            location: cursor.location(),
        });
    }
    Ok(())
}
