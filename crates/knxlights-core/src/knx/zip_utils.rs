use std::io::{Read, Seek};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zip::read::ZipFile;
use zip::result::{InvalidPassword, ZipError};
use zip::ZipArchive;

use crate::error::{KnxError, Result};

pub(crate) const PROJECT_ID_PREFIX: &str = "P-";
pub(crate) const PROJECT_INFO_FILE: &str = "project.xml";
pub(crate) const PROJECT_DATA_FILE: &str = "0.xml";

const ZIP_PASSWORD_SALT: &str = "21.project.ets.knx.org";
const ZIP_PASSWORD_ITERATIONS: u32 = 65_536;
const ZIP_PASSWORD_KEY_LEN: usize = 32;

/// Where the two project documents live inside a `.knxproj` archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProjectLayout {
    /// `P-XXXX/project.xml` and `P-XXXX/0.xml`
    Directory {
        project_id: String,
        info_path: String,
        data_path: String,
    },
    /// `P-XXXX.zip`, usually password protected, with both documents at its root
    Nested {
        project_id: String,
        archive_path: String,
    },
}

impl ProjectLayout {
    pub(crate) fn project_id(&self) -> &str {
        match self {
            ProjectLayout::Directory { project_id, .. } | ProjectLayout::Nested { project_id, .. } => {
                project_id
            }
        }
    }
}

/// Finds the single exported project among the archive entry names.
pub(crate) fn locate_project<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<ProjectLayout> {
    let mut project_id: Option<String> = None;
    let mut info_path = None;
    let mut data_path = None;
    let mut archive_path = None;

    for name in names {
        let (id, file) = match name.split_once('/') {
            Some((id, file)) if !file.contains('/') => (id, Some(file)),
            Some(_) => continue,
            None => match name.strip_suffix(".zip") {
                Some(id) => (id, None),
                None => continue,
            },
        };
        if !id.starts_with(PROJECT_ID_PREFIX) {
            if file.is_some_and(|file| file == PROJECT_INFO_FILE || file == PROJECT_DATA_FILE) {
                log::warn!("Found unsupported project id: {}", id);
            }
            continue;
        }

        match file {
            Some(PROJECT_INFO_FILE) => info_path = Some(name.to_string()),
            Some(PROJECT_DATA_FILE) => data_path = Some(name.to_string()),
            Some(_) => continue,
            None => archive_path = Some(name.to_string()),
        }

        match &project_id {
            Some(existing) if existing != id => {
                return Err(KnxError::MultipleProjectsExported {
                    first: existing.clone(),
                    second: id.to_string(),
                });
            }
            Some(_) => log::trace!("Project id already set"),
            None => {
                log::debug!("Using project id: {}", id);
                project_id = Some(id.to_string());
            }
        }
    }

    let project_id = project_id.ok_or_else(|| {
        KnxError::ProjectNotFound(format!("no entry matching '{}*'", PROJECT_ID_PREFIX))
    })?;

    match (info_path, data_path, archive_path) {
        (Some(info_path), Some(data_path), _) => Ok(ProjectLayout::Directory {
            project_id,
            info_path,
            data_path,
        }),
        (_, _, Some(archive_path)) => Ok(ProjectLayout::Nested {
            project_id,
            archive_path,
        }),
        (None, _, None) => Err(KnxError::ProjectNotFound(format!(
            "missing {}/{}",
            project_id, PROJECT_INFO_FILE
        ))),
        (Some(_), None, None) => Err(KnxError::ProjectNotFound(format!(
            "missing {}/{}",
            project_id, PROJECT_DATA_FILE
        ))),
    }
}

/// Opens one archive entry as a stream, decrypting it when a password is given.
pub(crate) fn open_entry<'a, R: Read + Seek>(
    zip: &'a mut ZipArchive<R>,
    path: &str,
    password: Option<&str>,
) -> Result<ZipFile<'a>> {
    log::debug!(
        "Reading entry {} (password: {})",
        path,
        if password.is_some() { "yes" } else { "no" }
    );
    let opened = match password {
        Some(password) => zip.by_name_decrypt(path, password.as_bytes()),
        None => zip.by_name(path).map(Ok),
    };
    match opened {
        Ok(Ok(file)) => Ok(file),
        Ok(Err(InvalidPassword)) => {
            log::warn!("Invalid password for {}", path);
            Err(KnxError::InvalidPassword)
        }
        Err(ZipError::UnsupportedArchive(msg)) if msg == ZipError::PASSWORD_REQUIRED => {
            log::warn!("Password required for {}", path);
            Err(KnxError::PasswordRequired)
        }
        Err(ZipError::FileNotFound) => Err(KnxError::ProjectNotFound(format!("missing {}", path))),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn read_entry_bytes<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    path: &str,
    password: Option<&str>,
) -> Result<Vec<u8>> {
    let mut file = open_entry(zip, path, password)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Turns the ETS project password into the password of the project archive.
pub fn derive_zip_password(project_password: &str) -> String {
    let mut password_bytes = Vec::with_capacity(project_password.len() * 2);
    for unit in project_password.encode_utf16() {
        password_bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let mut derived = [0u8; ZIP_PASSWORD_KEY_LEN];
    pbkdf2_hmac::<Sha256>(
        &password_bytes,
        ZIP_PASSWORD_SALT.as_bytes(),
        ZIP_PASSWORD_ITERATIONS,
        &mut derived,
    );
    BASE64_STANDARD.encode(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_zip_password_vectors() {
        assert_eq!(
            derive_zip_password("a"),
            "+FAwP4iI7/Pu4WB3HdIHbbFmteLahPAVkjJShKeozAA="
        );
        assert_eq!(
            derive_zip_password("test"),
            "2+IIP7ErCPPKxFjJXc59GFx2+w/1VTLHjJ2duc04CYQ="
        );
    }

    #[test]
    fn locates_directory_layout() -> anyhow::Result<()> {
        let layout = locate_project([
            "knx_master.xml",
            "M-0083/M-0083_A-0001.xml",
            "P-0A1B/project.xml",
            "P-0A1B/0.xml",
            "P-0A1B/Baggages/logo.png",
        ])?;
        assert_eq!(
            layout,
            ProjectLayout::Directory {
                project_id: "P-0A1B".to_string(),
                info_path: "P-0A1B/project.xml".to_string(),
                data_path: "P-0A1B/0.xml".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn locates_nested_layout() -> anyhow::Result<()> {
        let layout = locate_project(["knx_master.xml", "P-0A1B.signature", "P-0A1B.zip"])?;
        assert_eq!(layout.project_id(), "P-0A1B");
        assert!(matches!(layout, ProjectLayout::Nested { .. }));
        Ok(())
    }

    #[test]
    fn rejects_multiple_projects() {
        let result = locate_project(["P-0001/project.xml", "P-0001/0.xml", "P-0002/0.xml"]);
        assert!(matches!(
            result,
            Err(KnxError::MultipleProjectsExported { first, second }) if first == "P-0001" && second == "P-0002"
        ));
    }

    #[test]
    fn rejects_missing_project() {
        assert!(matches!(
            locate_project(["knx_master.xml", "X-0001/0.xml"]),
            Err(KnxError::ProjectNotFound(_))
        ));
        assert!(matches!(
            locate_project(["P-0001/project.xml"]),
            Err(KnxError::ProjectNotFound(_))
        ));
    }
}
