pub mod chunk_fields;

pub use chunk_fields::*;
