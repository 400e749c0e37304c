//! Errors raised while defining an expandable enum or reading a field's derived properties.
//!
//! Every failure is raised synchronously to the code performing the definition; nothing is
//! recovered internally and there is no soft-fail mode. The caller fixes the declaration and
//! defines the type again.

use std::fmt;

use crate::value::FieldValue;

/// Which part of a declaration collided with an existing field.
///
/// When a declaration repeats both the bare name and the value of an existing field, the
/// name is reported since it is checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConflictKind {
    /// The bare member name is already used by the hierarchy.
    Name,
    /// The value is already used by the hierarchy.
    Value,
}

/// A declared field repeats the bare name or the value of a field already present in the
/// hierarchy (inherited through any ancestor branch, or declared earlier in the same type).
///
/// Carries both sides of the collision so the message can name the offending declaration
/// and the field it collided with.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateFieldConflict {
    /// Name of the type whose definition was rejected.
    pub type_name: String,
    /// Bare name of the rejected declaration.
    pub field_name: String,
    /// Value of the rejected declaration.
    pub field_value: FieldValue,
    /// Qualified name (`"<Type>.<member>"`) of the field it collided with.
    pub existing_name: String,
    /// Value of the field it collided with.
    pub existing_value: FieldValue,
    /// Whether the name or the value collided.
    pub kind: ConflictKind,
}

impl fmt::Display for DuplicateFieldConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to create an expandable enum {ty} due to duplicated enum field! \
             {ty}.{name}: {value} conflicts with {existing}: {existing_value}",
            ty = self.type_name,
            name = self.field_name,
            value = self.field_value,
            existing = self.existing_name,
            existing_value = self.existing_value,
        )
    }
}

impl std::error::Error for DuplicateFieldConflict {}

/// Error returned when an enum type cannot be defined.
///
/// A rejected definition never produces a type: no descriptor is returned and none of the
/// fields that were already checked are reachable.
#[derive(Debug, Clone, PartialEq)]
pub enum DefineError {
    /// A declared field collides with an existing field.
    Conflict(DuplicateFieldConflict),
    /// The bases cannot be put in a consistent linearization order.
    InconsistentMro {
        type_name: String,
        /// Names of the direct bases, in declaration order.
        bases: Vec<String>,
    },
    /// The same base was listed twice.
    DuplicateBase { type_name: String, base: String },
    /// A base's ancestor chain is deeper than the configured limit.
    InheritanceTooDeep { type_name: String, limit: usize },
    /// The linearization grew past the configured limit.
    MroTooLong { type_name: String, limit: usize },
    /// The declared name is reserved for internal bookkeeping (dunder names, the field-type
    /// selector).
    ReservedName { type_name: String, field_name: String },
    /// The declared name is empty or contains the `.` qualifier separator.
    InvalidName { type_name: String, field_name: String },
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict(conflict) => write!(f, "{conflict}"),
            Self::InconsistentMro { type_name, bases } => write!(
                f,
                "Cannot create a consistent method resolution order (MRO) for {type_name} with bases {}",
                bases.join(", ")
            ),
            Self::DuplicateBase { type_name, base } => {
                write!(f, "duplicate base class {base} for expandable enum {type_name}")
            }
            Self::InheritanceTooDeep { type_name, limit } => {
                write!(f, "inheritance chain of {type_name} too deep (maximum depth {limit})")
            }
            Self::MroTooLong { type_name, limit } => {
                write!(f, "MRO of {type_name} exceeds maximum length {limit}")
            }
            Self::ReservedName { type_name, field_name } => {
                write!(f, "{type_name}.{field_name} uses a reserved name and cannot be an enum field")
            }
            Self::InvalidName { type_name, field_name } => {
                write!(f, "{type_name}.{field_name:?} is not a valid enum field name")
            }
        }
    }
}

impl std::error::Error for DefineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

impl From<DuplicateFieldConflict> for DefineError {
    fn from(conflict: DuplicateFieldConflict) -> Self {
        Self::Conflict(conflict)
    }
}

impl DefineError {
    /// Returns the field conflict, if this is one.
    #[must_use]
    pub fn as_conflict(&self) -> Option<&DuplicateFieldConflict> {
        match self {
            Self::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }

    /// Name of the type whose definition failed.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Conflict(conflict) => &conflict.type_name,
            Self::InconsistentMro { type_name, .. }
            | Self::DuplicateBase { type_name, .. }
            | Self::InheritanceTooDeep { type_name, .. }
            | Self::MroTooLong { type_name, .. }
            | Self::ReservedName { type_name, .. }
            | Self::InvalidName { type_name, .. } => type_name,
        }
    }
}

/// Error returned when a derived property cannot be read from a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// No field type in the field's capability chain provides the property.
    Unknown { field: String, property: String },
    /// The property exists but could not be computed from the field's value.
    Invalid {
        field: String,
        property: String,
        reason: String,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { field, property } => write!(f, "'{field}' has no property '{property}'"),
            Self::Invalid {
                field,
                property,
                reason,
            } => write!(f, "cannot compute '{property}' of '{field}': {reason}"),
        }
    }
}

impl std::error::Error for PropertyError {}
