//! Schema mapping from raw field maps to output profiles.

pub mod fields;
mod mapper;
pub mod synonyms;

pub use fields::{OutputField, OutputProfile, SurnameRule};
pub use mapper::{
    split_address, split_full_name, AddressSegments, MappingResult, SchemaMapper, SourceShape,
};
