pub mod external_tool_dto;
pub mod network_dto;
pub mod view_dto;
