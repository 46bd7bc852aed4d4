pub const PROJECT: &str = "Project";
pub const PROJECT_INFORMATION: &str = "ProjectInformation";

pub const TOPOLOGY: &str = "Topology";
pub const AREA: &str = "Area";
pub const LINE: &str = "Line";
pub const SEGMENT: &str = "Segment";
pub const DEVICE_INSTANCE: &str = "DeviceInstance";
pub const COM_OBJECT_INSTANCE_REFS: &str = "ComObjectInstanceRefs";
pub const COM_OBJECT_INSTANCE_REF: &str = "ComObjectInstanceRef";
pub const CONNECTORS: &str = "Connectors";
pub const SEND: &str = "Send";
pub const RECEIVE: &str = "Receive";

pub const GROUP_ADDRESSES: &str = "GroupAddresses";
pub const GROUP_RANGES: &str = "GroupRanges";
pub const GROUP_RANGE: &str = "GroupRange";
pub const GROUP_ADDRESS: &str = "GroupAddress";
