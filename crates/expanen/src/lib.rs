#![doc = include_str!("../../../README.md")]

mod builder;
mod enum_type;
mod error;
mod field;
mod field_type;
mod limits;
pub mod tracer;
mod value;

pub use crate::{
    builder::{EnumBuilder, FIELD_TYPE_SELECTOR},
    enum_type::{Base, EnumId, EnumType, ExpandableEnum},
    error::{ConflictKind, DefineError, DuplicateFieldConflict, PropertyError},
    field::{Field, FieldInterface, QUALIFIER_SEPARATOR, bare_name},
    field_type::{DerivedField, FieldBase, FieldType, FieldTypeRef, same_field_type},
    limits::{DEFAULT_MAX_INHERITANCE_DEPTH, DEFAULT_MAX_MRO_LENGTH, DefineLimits},
    tracer::{DefineEvent, DefineTracer, LogTracer, NoopTracer, RecordingTracer, StderrTracer},
    value::{ConversionError, FieldValue},
};
