use std::io::BufRead;

use crate::error::ParseError;
use crate::knx::address::GroupAddressValue;
use crate::knx::dpt::decode_datapoint_type;
use crate::knx::model::{GroupAddressRangeId, KnxProject};
use crate::knx::xml_cursor::XmlCursor;
use crate::knx::xml_tags;

/// Reads the `GroupAddresses` catalog: nested ranges holding the addresses.
pub(crate) fn read_group_addresses<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
) -> Result<(), ParseError> {
    cursor.read_children(|cursor, name| {
        match name {
            xml_tags::GROUP_RANGES => cursor.read_children(|cursor, name| {
                if name == xml_tags::GROUP_RANGE {
                    read_group_range(cursor, project, None)?;
                }
                Ok(())
            })?,
            xml_tags::GROUP_RANGE => read_group_range(cursor, project, None)?,
            _ => {}
        }
        Ok(())
    })
}

fn read_group_range<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
    parent: Option<GroupAddressRangeId>,
) -> Result<(), ParseError> {
    let start = cursor.required_u16_attribute("RangeStart")?;
    let end = cursor.required_u16_attribute("RangeEnd")?;
    let range = project.add_group_address_range(
        parent,
        cursor.attribute("Id").unwrap_or_default(),
        start,
        end,
        cursor.attribute_verbatim("Name").unwrap_or_default(),
        cursor.attribute("Description"),
    );
    log::debug!(
        "Found group range: {} ({}..{})",
        project.group_address_range(range).name,
        start,
        end
    );

    cursor.read_children(|cursor, name| {
        match name {
            xml_tags::GROUP_RANGE => read_group_range(cursor, project, Some(range))?,
            xml_tags::GROUP_ADDRESS => read_group_address(cursor, project, Some(range))?,
            _ => {}
        }
        Ok(())
    })
}

fn read_group_address<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    project: &mut KnxProject,
    range: Option<GroupAddressRangeId>,
) -> Result<(), ParseError> {
    let id = cursor.required_attribute("Id")?;
    let address = GroupAddressValue::new(cursor.required_u16_attribute("Address")?);
    let location = cursor.location();
    let datapoint_type = decode_datapoint_type(cursor.attribute("DatapointType").as_deref(), &location);

    let key = project.add_group_address(
        range,
        id,
        address,
        cursor.attribute_verbatim("Name").unwrap_or_default(),
        cursor.attribute("Description"),
        datapoint_type,
    );
    log::debug!("Found GA: {}", project.group_address(key));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Result<KnxProject, ParseError> {
        let mut cursor = XmlCursor::new(xml.as_bytes(), "0.xml");
        while cursor.start_name() != Some(xml_tags::GROUP_ADDRESSES) && !cursor.is_eof() {
            cursor.advance()?;
        }
        let mut project = KnxProject::new("P-0001", "Test");
        read_group_addresses(&mut cursor, &mut project)?;
        Ok(project)
    }

    #[test]
    fn reads_nested_catalog() -> anyhow::Result<()> {
        let project = parse(
            r#"<GroupAddresses>
                 <GroupRanges>
                   <GroupRange Id="R-1" RangeStart="2048" RangeEnd="4095" Name="Licht">
                     <GroupRange Id="R-2" RangeStart="2048" RangeEnd="2303" Name="EG">
                       <GroupAddress Id="P-0001-0_GA-1" Address="2049" Name="Licht Küche " DatapointType="DPST-1-1"/>
                       <GroupAddress Id="P-0001-0_GA-2" Address="2050" Name=""/>
                     </GroupRange>
                   </GroupRange>
                   <GroupRange Id="R-3" RangeStart="20480" RangeEnd="22527" Name="Status"/>
                 </GroupRanges>
               </GroupAddresses>"#,
        )?;

        let ranges = project.group_address_ranges();
        assert_eq!(ranges.len(), 3);
        assert!(ranges[0].is_top_level());
        assert_eq!(ranges[1].parent.map(|id| id.index()), Some(0));
        assert!(ranges[2].is_top_level());

        let gas = project.group_addresses();
        assert_eq!(gas.len(), 2);
        assert_eq!(gas[0].address.to_string(), "1/0/1");
        assert_eq!(gas[0].name, "Licht Küche ");
        assert_eq!(gas[0].datapoint_type.as_deref(), Some("1.001"));
        assert_eq!(gas[0].range.map(|id| id.index()), Some(1));
        assert!(!gas[1].has_name());
        assert_eq!(gas[1].datapoint_type, None);
        Ok(())
    }

    #[test]
    fn missing_address_is_malformed() {
        let result = parse(
            r#"<GroupAddresses><GroupRange RangeStart="0" RangeEnd="10"><GroupAddress Id="GA-1"/></GroupRange></GroupAddresses>"#,
        );
        assert!(matches!(
            result,
            Err(ParseError::MissingRequiredAttribute { ref attribute, .. }) if attribute == "Address"
        ));
    }

    #[test]
    fn non_numeric_range_start_is_malformed() {
        let result = parse(
            r#"<GroupAddresses><GroupRange RangeStart="x" RangeEnd="10"/></GroupAddresses>"#,
        );
        assert!(matches!(result, Err(ParseError::InvalidAttribute { .. })));
    }
}
