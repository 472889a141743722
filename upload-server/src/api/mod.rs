pub mod dtos;
pub mod error;
pub mod upload;
