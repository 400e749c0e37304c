//! Materialized enum members.
//!
//! A [`Field`] is created exactly once, when its declaring type is defined, and is shared
//! by handle afterwards: looking a member up through the declaring type or through any
//! descendant yields the same field. Equality is handle identity, never structural, so two
//! independently declared fields with the same name and value are different fields.
//!
//! # Type identity
//!
//! A field records the id of the type that declared it together with that type's lineage
//! (its own id followed by every enum ancestor in linearization order). "Is this field a
//! `B`?" is a containment test on the lineage, so a field inherited by a descendant keeps
//! answering as an instance of its declaring type and never as one of the descendant.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    enum_type::{EnumId, EnumType},
    error::PropertyError,
    field_type::{FieldType, FieldTypeRef, downcast, same_field_type},
    value::FieldValue,
};

/// Separator between the declaring type name and the member name.
pub const QUALIFIER_SEPARATOR: char = '.';

/// The minimal contract every field satisfies.
pub trait FieldInterface: fmt::Display {
    /// Fully qualified identifier, `"<DeclaringType>.<member>"`.
    fn name(&self) -> &str;

    /// The value as declared, untouched.
    fn value(&self) -> &FieldValue;

    /// Member name with the qualifying prefix stripped.
    fn bare_name(&self) -> &str {
        bare_name(self.name())
    }
}

/// Strips the qualifier from `qualified`: everything up to and including the last separator.
#[must_use]
pub fn bare_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(QUALIFIER_SEPARATOR)
        .map_or(qualified, |(_, bare)| bare)
}

/// Shared handle to one materialized enum member.
#[derive(Clone)]
pub struct Field(Arc<FieldData>);

struct FieldData {
    /// Qualified name, `"<DeclaringType>.<member>"`.
    name: String,
    value: FieldValue,
    /// Name of the declaring type.
    type_name: Arc<str>,
    /// Declaring type id first, then every enum ancestor in linearization order.
    lineage: Arc<[EnumId]>,
    /// Field types of the declaring type's linearization, nearest first.
    capabilities: Arc<[FieldTypeRef]>,
}

impl Field {
    pub(crate) fn new(
        type_name: &Arc<str>,
        member: &str,
        value: FieldValue,
        lineage: &Arc<[EnumId]>,
        capabilities: &Arc<[FieldTypeRef]>,
    ) -> Self {
        Self(Arc::new(FieldData {
            name: format!("{type_name}{QUALIFIER_SEPARATOR}{member}"),
            value,
            type_name: Arc::clone(type_name),
            lineage: Arc::clone(lineage),
            capabilities: Arc::clone(capabilities),
        }))
    }

    /// Qualified name, `"<DeclaringType>.<member>"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Member name without the declaring type.
    #[must_use]
    pub fn bare_name(&self) -> &str {
        bare_name(&self.0.name)
    }

    /// The value as declared.
    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.0.value
    }

    /// Id of the type that declared this field.
    #[must_use]
    pub fn declaring_type(&self) -> EnumId {
        self.0.lineage[0]
    }

    /// Name of the type that declared this field.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// Returns true if this field is an instance of `ty`: `ty` declared it, or `ty` is an
    /// ancestor of the declaring type.
    #[must_use]
    pub fn is_instance_of(&self, ty: &EnumType) -> bool {
        self.0.lineage.contains(&ty.id())
    }

    /// Returns true if the declaring type composes `field_type`.
    #[must_use]
    pub fn has_field_type(&self, field_type: &FieldTypeRef) -> bool {
        self.0.capabilities.iter().any(|own| same_field_type(own, field_type))
    }

    /// The field types this field carries, nearest first.
    #[must_use]
    pub fn field_types(&self) -> &[FieldTypeRef] {
        &self.0.capabilities
    }

    /// Returns the first field type of concrete type `T` this field carries.
    #[must_use]
    pub fn field_type<T: FieldType>(&self) -> Option<&T> {
        self.0.capabilities.iter().find_map(downcast::<T>)
    }

    /// Computes the derived property `property` from this field's value.
    ///
    /// Field types are asked nearest first; the first one that knows the property answers.
    pub fn property(&self, property: &str) -> Result<FieldValue, PropertyError> {
        let computed = self
            .0
            .capabilities
            .iter()
            .find_map(|field_type| field_type.property(property, &self.0.value));
        match computed {
            Some(Ok(value)) => Ok(value),
            Some(Err(reason)) => Err(PropertyError::Invalid {
                field: self.0.name.clone(),
                property: property.to_owned(),
                reason,
            }),
            None => Err(PropertyError::Unknown {
                field: self.0.name.clone(),
                property: property.to_owned(),
            }),
        }
    }

    /// Returns true if both handles refer to the same materialized field.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FieldInterface for Field {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn value(&self) -> &FieldValue {
        Self::value(self)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.capabilities.iter().find_map(|field_type| field_type.describe(self)) {
            Some(description) => f.write_str(&description),
            None => write!(f, "({}: {})", self.0.name, self.0.value),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .field("type", &self.0.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_strips_the_last_qualifier() {
        assert_eq!(bare_name("E.F1"), "F1");
        assert_eq!(bare_name("outer.E.F1"), "F1");
        assert_eq!(bare_name("F1"), "F1");
    }
}
