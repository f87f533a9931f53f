//! Data Transfer Objects for REST request/response serialization.

pub mod subscription_dto;
pub mod system_dto;

pub use subscription_dto::*;
pub use system_dto::*;
