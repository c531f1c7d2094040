pub mod connect_point;
pub mod device;
pub mod inventory;
pub mod link;
pub mod link_detail;
pub mod path;
pub mod topology;
