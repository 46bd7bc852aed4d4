pub(crate) mod group_addresses;
pub(crate) mod project;
pub(crate) mod topology;
