//! Schema field extraction and merging

pub mod fields;

pub use fields::{merge_fields, Field, FieldOrigin, FieldType, MergedSchema, SchemaWarning};
