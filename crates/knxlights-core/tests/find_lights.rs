use std::io::{Cursor, Write};

use knxlights_core::{
    find_lights,
    load_knxproj_bytes,
    AnalysisState,
    AnalyzerConfig,
    Fixture,
    HeuristicCharacteristics,
    KnxError,
    KnxProject,
    KnxProjectAnalyzer,
    KnxProjectCharacteristics,
    NamingConvention,
};
use zip::write::FileOptions;
use zip::ZipWriter;

const PROJECT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<KNX xmlns="http://knx.org/xml/project/21" CreatedBy="ETS5" ToolVersion="5.7.1093.38570">
  <Project Id="P-04F2">
    <ProjectInformation Name="Einfamilienhaus" GroupAddressStyle="ThreeLevel" />
  </Project>
</KNX>"#;

const DATA_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<KNX xmlns="http://knx.org/xml/project/21">
  <Project Id="P-04F2">
    <Installations>
      <Installation Name="" BCUKey="4294967295">
        <Topology>
          <Area Id="P-04F2-0_A-2" Name="Haus" Address="1">
            <Line Id="P-04F2-0_L-3" Name="Erdgeschoss" Address="1">
              <DeviceInstance Id="P-04F2-0_DI-1" Name="Schaltaktor 8-fach" Address="1">
                <ComObjectInstanceRefs>
                  <ComObjectInstanceRef RefId="O-0_R-1" DatapointType="DPST-1-1" Text="Kanal A Schalten">
                    <Connectors>
                      <Receive GroupAddressRefId="P-04F2-0_GA-1" />
                    </Connectors>
                  </ComObjectInstanceRef>
                  <ComObjectInstanceRef RefId="O-3_R-4" DatapointType="DPST-1-11" ReadFlag="Enabled">
                    <Connectors>
                      <Send GroupAddressRefId="P-04F2-0_GA-2" />
                    </Connectors>
                  </ComObjectInstanceRef>
                </ComObjectInstanceRefs>
              </DeviceInstance>
              <DeviceInstance Id="P-04F2-0_DI-2" Name="Dimmaktor" Address="2">
                <ComObjectInstanceRefs>
                  <ComObjectInstanceRef RefId="O-0_R-1" DatapointType="DPST-1-1">
                    <Connectors>
                      <Receive GroupAddressRefId="P-04F2-0_GA-3" />
                    </Connectors>
                  </ComObjectInstanceRef>
                  <ComObjectInstanceRef RefId="O-2_R-3" DatapointType="DPST-3-7">
                    <Connectors>
                      <Receive GroupAddressRefId="P-04F2-0_GA-4" />
                    </Connectors>
                  </ComObjectInstanceRef>
                </ComObjectInstanceRefs>
              </DeviceInstance>
            </Line>
          </Area>
        </Topology>
        <GroupAddresses>
          <GroupRanges>
            <GroupRange Id="P-04F2-0_GR-1" RangeStart="2048" RangeEnd="4095" Name="Licht">
              <GroupRange Id="P-04F2-0_GR-2" RangeStart="2048" RangeEnd="2303" Name="Küche">
                <GroupAddress Id="P-04F2-0_GA-1" Address="2049" Name="Light Kitchen On/Off" DatapointType="DPST-1-1" />
                <GroupAddress Id="P-04F2-0_GA-2" Address="2052" Name="Light Kitchen Status" DatapointType="DPST-1-11" />
              </GroupRange>
              <GroupRange Id="P-04F2-0_GR-3" RangeStart="2304" RangeEnd="2559" Name="Wohnen">
                <GroupAddress Id="P-04F2-0_GA-3" Address="2304" Name="Licht Wohnen Ein/Aus" DatapointType="DPST-1-1" />
                <GroupAddress Id="P-04F2-0_GA-4" Address="2305" Name="Licht Wohnen Dimmen" />
                <GroupAddress Id="P-04F2-0_GA-5" Address="2306" Name="Licht Wohnen Wert" DatapointType="DPST-5-1" />
                <GroupAddress Id="P-04F2-0_GA-6" Address="2307" Name="Licht Wohnen Status" DatapointType="DPST-1-11" />
                <GroupAddress Id="P-04F2-0_GA-7" Address="2308" Name="Licht Wohnen Wert Status" DatapointType="DPST-5-1" />
              </GroupRange>
            </GroupRange>
            <GroupRange Id="P-04F2-0_GR-4" RangeStart="4096" RangeEnd="6143" Name="Heizung">
              <GroupAddress Id="P-04F2-0_GA-8" Address="4097" Name="Heizung Bad Stellwert" DatapointType="DPST-5-1" />
            </GroupRange>
          </GroupRanges>
        </GroupAddresses>
      </Installation>
    </Installations>
  </Project>
</KNX>"#;

const EMPTY_DATA_XML: &str = r#"<KNX><Project Id="P-04F2"><Installations><Installation Name="" /></Installations></Project></KNX>"#;

fn knxproj(data_xml: &str) -> anyhow::Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in [
        ("knx_master.xml", "<KNX />"),
        ("P-04F2/project.xml", PROJECT_XML),
        ("P-04F2/0.xml", data_xml),
    ] {
        writer.start_file(name, FileOptions::default())?;
        writer.write_all(contents.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

fn addresses(project: &KnxProject, fixture: &Fixture) -> Vec<String> {
    fixture
        .group_addresses()
        .into_iter()
        .map(|id| project.group_address(id).address.to_string())
        .collect()
}

#[test]
fn finds_light_and_dimmable_light() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let project = load_knxproj_bytes(&knxproj(DATA_XML)?, None)?;

    let mut analyzer = KnxProjectAnalyzer::with_default_characteristics(project);
    let fixtures = analyzer.analyze()?.to_vec();
    assert_eq!(analyzer.state(), AnalysisState::Done);
    assert_eq!(fixtures.len(), 2);

    let project = analyzer.project();
    let light = fixtures.iter().find(|fixture| !fixture.is_dimmable()).unwrap();
    assert_eq!(light.name(), "Light Kitchen");
    assert_eq!(addresses(project, light), vec!["1/0/1", "1/0/4"]);

    let dimmable = fixtures.iter().find(|fixture| fixture.is_dimmable()).unwrap();
    assert_eq!(dimmable.name(), "Licht Wohnen");
    assert_eq!(
        addresses(project, dimmable),
        vec!["1/1/0", "1/1/3", "1/1/1", "1/1/2", "1/1/4"]
    );
    Ok(())
}

#[test]
fn missing_type_is_taken_from_linked_object() -> anyhow::Result<()> {
    let project = load_knxproj_bytes(&knxproj(DATA_XML)?, None)?;
    let dim = project.find_group_address("P-04F2-0_GA-4").unwrap();
    assert_eq!(project.group_address(dim).datapoint_type, None);
    assert_eq!(project.group_address(dim).listening_communication_objects.len(), 1);
    assert!(project.group_address(dim).writing_communication_objects.is_empty());

    let mut analyzer = KnxProjectAnalyzer::with_default_characteristics(project);
    analyzer.analyze()?;
    // only writing objects complete a group address
    assert_eq!(analyzer.project().group_address(dim).datapoint_type, None);
    assert_eq!(analyzer.warnings(), 0);
    Ok(())
}

#[test]
fn links_both_directions() -> anyhow::Result<()> {
    let project = load_knxproj_bytes(&knxproj(DATA_XML)?, None)?;
    let status = project.find_group_address("P-04F2-0_GA-2").unwrap();
    let writers = &project.group_address(status).writing_communication_objects;
    assert_eq!(writers.len(), 1);

    let object = project.communication_object(writers[0]);
    assert_eq!(object.send_group_address, Some(status));
    assert!(object.read_flag);
    assert_eq!(project.device(object.device).name.as_deref(), Some("Schaltaktor 8-fach"));
    Ok(())
}

#[test]
fn analyze_twice_returns_same_fixtures() -> anyhow::Result<()> {
    let project = load_knxproj_bytes(&knxproj(DATA_XML)?, None)?;
    let mut analyzer = KnxProjectAnalyzer::with_default_characteristics(project);
    let first = analyzer.analyze()?.to_vec();
    let second = analyzer.analyze()?.to_vec();
    assert_eq!(first, second);
    assert_eq!(analyzer.state(), AnalysisState::Done);
    Ok(())
}

#[test]
fn learning_twice_gives_same_answers() -> anyhow::Result<()> {
    let project = load_knxproj_bytes(&knxproj(DATA_XML)?, None)?;
    let switch = project.find_group_address("P-04F2-0_GA-3").unwrap();
    let primary = project.group_address(switch);

    let mut once = HeuristicCharacteristics::default();
    once.learn(&project);
    let mut twice = HeuristicCharacteristics::default();
    twice.learn(&project);
    twice.learn(&project);

    assert_eq!(once.name_terms(switch), twice.name_terms(switch));
    assert_eq!(
        once.find_matching_status_group_address(primary),
        twice.find_matching_status_group_address(primary)
    );
    assert_eq!(
        once.find_matching_brightness_status_group_address(primary),
        twice.find_matching_brightness_status_group_address(primary)
    );
    Ok(())
}

#[test]
fn project_without_group_addresses_is_empty() -> anyhow::Result<()> {
    let project = load_knxproj_bytes(&knxproj(EMPTY_DATA_XML)?, None)?;
    assert_eq!(project.name, "Einfamilienhaus");

    let mut analyzer = KnxProjectAnalyzer::with_default_characteristics(project);
    assert!(matches!(analyzer.analyze(), Err(KnxError::EmptyProject)));
    assert_eq!(analyzer.state(), AnalysisState::Failed);
    Ok(())
}

#[test]
fn find_lights_reads_file() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("knxlights-{}.knxproj", std::process::id()));
    std::fs::write(&path, knxproj(DATA_XML)?)?;

    let result = find_lights(&path, None, NamingConvention::default(), AnalyzerConfig::default());
    std::fs::remove_file(&path)?;
    let (project, fixtures) = result?;
    assert_eq!(project.id, "P-04F2");
    assert_eq!(fixtures.len(), 2);
    Ok(())
}

#[test]
fn strict_prefix_threshold_rejects_partial_names() -> anyhow::Result<()> {
    let project = load_knxproj_bytes(&knxproj(DATA_XML)?, None)?;
    let convention = NamingConvention::default().with_prefix_match_threshold(1.0);
    let mut analyzer = KnxProjectAnalyzer::new(project, HeuristicCharacteristics::new(convention));
    assert!(analyzer.analyze()?.is_empty());
    Ok(())
}
