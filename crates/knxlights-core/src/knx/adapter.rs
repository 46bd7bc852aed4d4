use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::Result;
use crate::knx::linker::link_group_addresses;
use crate::knx::model::KnxProject;
use crate::knx::parsers::project::{read_project_data, read_project_info};
use crate::knx::xml_cursor::XmlCursor;
use crate::knx::zip_utils::{
    derive_zip_password, locate_project, open_entry, read_entry_bytes, ProjectLayout,
    PROJECT_DATA_FILE, PROJECT_INFO_FILE,
};

/// Loads and links the project exported to the `.knxproj` file at `path`.
pub fn load_knxproj(path: impl AsRef<Path>, password: Option<&str>) -> Result<KnxProject> {
    let path = path.as_ref();
    log::info!("Loading KNX project from: {}", path.display());
    let file = File::open(path)?;
    load_knxproj_reader(BufReader::new(file), password)
}

pub fn load_knxproj_bytes(data: &[u8], password: Option<&str>) -> Result<KnxProject> {
    log::info!("Loading KNX project from bytes ({} bytes)", data.len());
    load_knxproj_reader(Cursor::new(data), password)
}

/// Reads a `.knxproj` archive. `password` is the ETS project password, not
/// the zip password.
pub fn load_knxproj_reader<R: Read + Seek>(reader: R, password: Option<&str>) -> Result<KnxProject> {
    let mut zip = ZipArchive::new(reader)?;
    let names: Vec<String> = zip.file_names().map(str::to_string).collect();
    let layout = locate_project(names.iter().map(String::as_str))?;

    let zip_password = password.map(derive_zip_password);
    if zip_password.is_some() {
        log::info!("Derived zip password for encrypted project");
    }
    let zip_password = zip_password.as_deref();

    let mut project = match &layout {
        ProjectLayout::Directory {
            project_id,
            info_path,
            data_path,
        } => read_project(&mut zip, project_id, info_path, data_path, zip_password)?,
        ProjectLayout::Nested {
            project_id,
            archive_path,
        } => {
            log::debug!("Opening nested archive {}", archive_path);
            let nested_bytes = read_entry_bytes(&mut zip, archive_path, zip_password)?;
            let mut nested = ZipArchive::new(Cursor::new(nested_bytes))?;
            read_project(
                &mut nested,
                project_id,
                PROJECT_INFO_FILE,
                PROJECT_DATA_FILE,
                zip_password,
            )?
        }
    };

    link_group_addresses(&mut project);
    log::info!(
        "Loaded project '{}' ({}): {} devices, {} communication objects, {} GAs",
        project.name,
        layout.project_id(),
        project.devices().len(),
        project.communication_objects().len(),
        project.group_addresses().len()
    );
    Ok(project)
}

fn read_project<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    project_id: &str,
    info_path: &str,
    data_path: &str,
    password: Option<&str>,
) -> Result<KnxProject> {
    log::debug!("Reading project info from: {}", info_path);
    let name = {
        let entry = open_entry(zip, info_path, password)?;
        let mut cursor = XmlCursor::new(BufReader::new(entry), info_path);
        read_project_info(&mut cursor, project_id)?
    };

    let mut project = KnxProject::new(project_id, name);
    log::debug!("Reading project data from: {}", data_path);
    let entry = open_entry(zip, data_path, password)?;
    let mut cursor = XmlCursor::new(BufReader::new(entry), data_path);
    read_project_data(&mut cursor, &mut project)?;
    Ok(project)
}
