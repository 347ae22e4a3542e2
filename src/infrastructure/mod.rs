//! Infrastructure layer - collaborator implementations

pub mod cache;
pub mod datasource;
