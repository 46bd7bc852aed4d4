use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KnxError>;

/// Position inside one of the project documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub document: String,
    pub position: u64,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.document, self.position)
    }
}

/// A project document that cannot be read as an ETS export.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Missing required attribute '{attribute}' on {element} ({location})")]
    MissingRequiredAttribute {
        element: String,
        attribute: String,
        location: Location,
    },

    #[error("Invalid attribute '{attribute}' on {element}: '{value}' (expected {expected}) ({location})")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        expected: String,
        location: Location,
    },

    #[error("Declared project id '{declared}' doesn't match expected id '{expected}' ({location})")]
    ProjectIdMismatch {
        declared: String,
        expected: String,
        location: Location,
    },

    #[error("Unexpected end of document ({location})")]
    UnexpectedEnd { location: Location },

    #[error("Processed more end elements than start elements ({location})")]
    UnbalancedElements { location: Location },

    #[error("XML error: {message} ({location})")]
    Xml { message: String, location: Location },
}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            ParseError::MissingRequiredAttribute { location, .. }
            | ParseError::InvalidAttribute { location, .. }
            | ParseError::ProjectIdMismatch { location, .. }
            | ParseError::UnexpectedEnd { location }
            | ParseError::UnbalancedElements { location }
            | ParseError::Xml { location, .. } => location,
        }
    }
}

#[derive(Error, Debug)]
pub enum KnxError {
    #[error("Malformed project document: {0}")]
    MalformedDocument(#[from] ParseError),

    #[error("Multiple projects not supported, export only one project from ETS (found '{first}' and '{second}')")]
    MultipleProjectsExported { first: String, second: String },

    #[error("Unable to locate project data in .knxproj: {0}")]
    ProjectNotFound(String),

    #[error("The project does not contain any group address")]
    EmptyProject,

    #[error("Encrypted KNX project: password required")]
    PasswordRequired,

    #[error("Invalid password for KNX project")]
    InvalidPassword,

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
