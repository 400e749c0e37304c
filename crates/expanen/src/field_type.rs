//! Field types: capability sets layered on top of a field's raw value.
//!
//! Every enum type has an effective field type (its selector, [`FieldBase`] unless
//! overridden) and may compose further field types as mixin bases. A materialized field
//! carries the field types of its declaring type's linearization, nearest first, and answers
//! derived-property lookups by asking each in turn.

use std::{
    any::Any,
    fmt,
    sync::{Arc, LazyLock},
};

use indexmap::IndexMap;

use crate::{field::Field, value::FieldValue};

/// Shared handle to a field type.
///
/// Field types are compared by handle identity: two `Arc`s pointing at the same allocation
/// are the same field type, two separately allocated values of the same Rust type are not.
/// Build a field type once (a `static LazyLock`, or a handle cloned around) and reuse it.
pub type FieldTypeRef = Arc<dyn FieldType>;

/// A capability set for fields: derived properties computed from the raw value.
///
/// Implementations only inspect the value handed to them; no field type validates or
/// transforms the stored value.
pub trait FieldType: Any + fmt::Debug + Send + Sync {
    /// Name shown in linearizations and diagnostics.
    fn type_name(&self) -> &str;

    /// Names of the derived properties this field type provides.
    fn property_names(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Computes the derived property `name` from `value`.
    ///
    /// Returns `None` when this field type does not provide `name`, `Some(Err(reason))` when it
    /// does but `value` does not support it.
    fn property(&self, _name: &str, _value: &FieldValue) -> Option<Result<FieldValue, String>> {
        None
    }

    /// Custom rendering for fields carrying this capability.
    ///
    /// The first field type in the linearization that returns `Some` decides how the field
    /// renders. [`FieldBase`] always answers, so a mixin only wins when it precedes it, which
    /// is the case when the mixin is selected with [`EnumBuilder::field_type`](crate::EnumBuilder::field_type).
    fn describe(&self, _field: &Field) -> Option<String> {
        None
    }
}

/// Returns true if both handles point at the same field type.
#[must_use]
pub fn same_field_type(a: &FieldTypeRef, b: &FieldTypeRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Identity key of a field type handle.
pub(crate) fn field_type_key(field_type: &FieldTypeRef) -> usize {
    Arc::as_ptr(field_type).cast::<()>().addr()
}

/// Downcasts a field type to its concrete Rust type.
pub(crate) fn downcast<T: FieldType>(field_type: &FieldTypeRef) -> Option<&T> {
    let field_type: &dyn FieldType = &**field_type;
    let any: &dyn Any = field_type;
    any.downcast_ref::<T>()
}

static FIELD_BASE: LazyLock<FieldTypeRef> = LazyLock::new(|| Arc::new(FieldBase));

/// The default field type.
///
/// Provides exactly the [`FieldInterface`](crate::FieldInterface) contract: a qualified
/// name, the untouched value, and `(<name>: <value>)` rendering. No derived properties.
///
/// Because `FieldBase` always describes a field, field types that come after it in a
/// linearization never get to render.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldBase;

impl FieldBase {
    /// The process-wide `FieldBase` handle every enum type falls back to.
    #[must_use]
    pub fn shared() -> FieldTypeRef {
        Arc::clone(&FIELD_BASE)
    }
}

impl FieldType for FieldBase {
    fn type_name(&self) -> &str {
        "FieldBase"
    }

    fn describe(&self, field: &Field) -> Option<String> {
        Some(format!("({}: {})", field.name(), field.value()))
    }
}

type PropertyFn = Box<dyn Fn(&FieldValue) -> Result<FieldValue, String> + Send + Sync>;
type DescribeFn = Box<dyn Fn(&Field) -> String + Send + Sync>;

/// A field type assembled from closures.
///
/// ```ignore
/// let error = DerivedField::new("Error")
///     .property("code", |v| split(v).map(|(code, _)| code.into()))
///     .property("description", |v| split(v).map(|(_, desc)| desc.into()))
///     .into_ref();
/// ```
pub struct DerivedField {
    name: String,
    properties: IndexMap<String, PropertyFn>,
    describe: Option<DescribeFn>,
}

impl DerivedField {
    /// Creates an empty field type named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
            describe: None,
        }
    }

    /// Adds a derived property. A later property with the same name replaces the earlier one.
    #[must_use]
    pub fn property<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<FieldValue, String> + Send + Sync + 'static,
    {
        self.properties.insert(name.into(), Box::new(compute));
        self
    }

    /// Sets a custom rendering for fields carrying this field type.
    #[must_use]
    pub fn describe_with<F>(mut self, describe: F) -> Self
    where
        F: Fn(&Field) -> String + Send + Sync + 'static,
    {
        self.describe = Some(Box::new(describe));
        self
    }

    /// Wraps this field type in a shareable handle.
    #[must_use]
    pub fn into_ref(self) -> FieldTypeRef {
        Arc::new(self)
    }
}

impl fmt::Debug for DerivedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedField")
            .field("name", &self.name)
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("describe", &self.describe.is_some())
            .finish()
    }
}

impl FieldType for DerivedField {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    fn property(&self, name: &str, value: &FieldValue) -> Option<Result<FieldValue, String>> {
        self.properties.get(name).map(|compute| compute(value))
    }

    fn describe(&self, field: &Field) -> Option<String> {
        self.describe.as_ref().map(|describe| describe(field))
    }
}
