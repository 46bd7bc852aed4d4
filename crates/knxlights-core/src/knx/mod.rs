pub mod adapter;
pub mod address;
pub mod dpt;
pub mod linker;
pub mod model;
pub(crate) mod parsers;
pub mod xml_cursor;
pub(crate) mod xml_tags;
pub(crate) mod zip_utils;

pub use adapter::{load_knxproj, load_knxproj_bytes, load_knxproj_reader};
pub use address::{GroupAddressValue, InvalidGroupAddress};
pub use dpt::{decode_datapoint_type, DatapointType, UNKNOWN_DATAPOINT_TYPE};
pub use linker::link_group_addresses;
pub use model::*;
pub use zip_utils::derive_zip_password;
