//! Tests for field types: capability sets composed onto enum fields.
//!
//! A field type is mixed into an enum type as an extra base, or selected with
//! `EnumBuilder::field_type`. Every field of the type then answers the field type's derived
//! properties, computed from the raw value.

use std::sync::{Arc, LazyLock};

use expanen::{
    Base, DefineEvent, DerivedField, ExpandableEnum, Field, FieldBase, FieldType, FieldTypeRef, FieldValue,
    PropertyError, RecordingTracer, same_field_type,
};
use pretty_assertions::assert_eq;

/// Field type over `"<code>: <description>"` strings, with a typed accessor.
#[derive(Debug)]
struct CodedMessage;

impl CodedMessage {
    fn split(value: &FieldValue) -> Result<(i64, &str), String> {
        let (code, description) = value
            .as_str()
            .and_then(|s| s.split_once(": "))
            .ok_or_else(|| format!("{} is not '<code>: <description>'", value.py_repr()))?;
        let code = code.parse::<i64>().map_err(|err| format!("invalid code {code:?}: {err}"))?;
        Ok((code, description))
    }

    fn code(&self, field: &Field) -> Option<i64> {
        Self::split(field.value()).ok().map(|(code, _)| code)
    }
}

impl FieldType for CodedMessage {
    fn type_name(&self) -> &str {
        "CodedMessage"
    }

    fn property_names(&self) -> Vec<&str> {
        vec!["code", "description"]
    }

    fn property(&self, name: &str, value: &FieldValue) -> Option<Result<FieldValue, String>> {
        let split = Self::split(value);
        match name {
            "code" => Some(split.map(|(code, _)| FieldValue::Int(code))),
            "description" => Some(split.map(|(_, description)| description.into())),
            _ => None,
        }
    }
}

static CODED_MESSAGE: LazyLock<FieldTypeRef> = LazyLock::new(|| Arc::new(CodedMessage));

fn coded_message() -> FieldTypeRef {
    Arc::clone(&CODED_MESSAGE)
}

fn base_names(bases: &[Base]) -> Vec<&str> {
    bases.iter().map(Base::name).collect()
}

/// A field type providing a single constant property.
fn constant(type_name: &str, property: &'static str, value: &'static str) -> FieldTypeRef {
    DerivedField::new(type_name)
        .property(property, move |_| Ok(FieldValue::from(value)))
        .into_ref()
}

// =============================================================================
// 1. Custom Field Type
// =============================================================================

/// Derived properties are computed from the raw value, which stays untouched.
#[test]
fn custom_field_type_properties() {
    let e = ExpandableEnum::define("E")
        .mixin(coded_message())
        .field("F1", "123: Some description")
        .field("F2", "456: Some other description")
        .build()
        .unwrap();

    assert_eq!(e["F1"].to_string(), "(E.F1: 123: Some description)");
    assert_eq!(e["F2"].to_string(), "(E.F2: 456: Some other description)");
    assert_eq!(e["F1"].name(), "E.F1");
    assert_eq!(*e["F1"].value(), FieldValue::from("123: Some description"));

    assert_eq!(e["F1"].property("code").unwrap(), FieldValue::Int(123));
    assert_eq!(e["F2"].property("code").unwrap(), FieldValue::Int(456));
    assert_eq!(e["F1"].property("description").unwrap(), FieldValue::from("Some description"));
    assert_eq!(e["F2"].property("description").unwrap(), FieldValue::from("Some other description"));

    assert!(e["F1"].is_instance_of(&e));
    assert!(e["F1"].has_field_type(&coded_message()));
    assert!(e["F1"].has_field_type(&FieldBase::shared()));
}

/// The mixin follows the enum base, and the default field type is still provided by the root.
#[test]
fn custom_field_type_bases() {
    let e = ExpandableEnum::define("E")
        .mixin(coded_message())
        .field("F1", "123: Some description")
        .build()
        .unwrap();

    assert_eq!(base_names(e.bases()), ["ExpandableEnum", "CodedMessage"]);
    assert_eq!(base_names(e.mro()), ["ExpandableEnum", "FieldBase", "CodedMessage"]);
    assert!(same_field_type(e.field_type(), &FieldBase::shared()));
    assert!(e.has_field_type(&coded_message()));
    assert!(!ExpandableEnum::root().has_field_type(&coded_message()));
}

/// The concrete field type can be recovered from a field for typed access.
#[test]
fn typed_field_type_access() {
    let e = ExpandableEnum::define("E")
        .mixin(coded_message())
        .field("F1", "123: Some description")
        .build()
        .unwrap();

    let coded = e["F1"].field_type::<CodedMessage>().unwrap();
    assert_eq!(coded.code(&e["F1"]), Some(123));
    assert!(e["F1"].field_type::<DerivedField>().is_none());
    assert!(e["F1"].field_type::<FieldBase>().is_some());
}

/// Field types are identified by handle: a second `CodedMessage` allocation is another type.
#[test]
fn field_types_compare_by_handle() {
    let other: FieldTypeRef = Arc::new(CodedMessage);
    assert!(same_field_type(&coded_message(), &coded_message()));
    assert!(!same_field_type(&coded_message(), &other));

    let e = ExpandableEnum::define("E").mixin(coded_message()).build().unwrap();
    assert!(!e.has_field_type(&other));
}

// =============================================================================
// 2. Property Errors
// =============================================================================

/// A property nobody provides is reported as unknown.
#[test]
fn unknown_property() {
    let e = ExpandableEnum::define("E").field("F1", 123).build().unwrap();
    let err = e["F1"].property("code").unwrap_err();
    assert_eq!(
        err,
        PropertyError::Unknown {
            field: "E.F1".to_owned(),
            property: "code".to_owned(),
        }
    );
    assert_eq!(err.to_string(), "'E.F1' has no property 'code'");
}

/// A property that cannot be computed from the value reports why.
#[test]
fn invalid_property_value() {
    let e = ExpandableEnum::define("E")
        .mixin(coded_message())
        .field("F1", 123)
        .field("F2", "abc: description")
        .build()
        .unwrap();

    let err = e["F1"].property("code").unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot compute 'code' of 'E.F1': 123 is not '<code>: <description>'"
    );

    let err = e["F2"].property("code").unwrap_err();
    assert!(matches!(err, PropertyError::Invalid { .. }), "got {err:?}");
    assert_eq!(e["F2"].property("description").unwrap(), FieldValue::from("description"));
}

// =============================================================================
// 3. Composition Across The Hierarchy
// =============================================================================

/// Each level may add its own field type; inherited fields keep the capabilities of the type
/// that declared them.
#[test]
fn different_field_types_across_hierarchy() {
    let b_type = DerivedField::new("BFieldType").into_ref();
    let e_type = DerivedField::new("EFieldType").into_ref();

    let b = ExpandableEnum::define("B").mixin(Arc::clone(&b_type)).field("F1", 0).build().unwrap();
    let e = b.extend("E").mixin(Arc::clone(&e_type)).field("F2", 1).build().unwrap();

    assert_eq!(e["F1"].to_string(), "(B.F1: 0)");
    assert_eq!(e["F2"].to_string(), "(E.F2: 1)");
    assert_eq!(e["F1"].type_name(), "B");
    assert_eq!(e["F2"].type_name(), "E");

    assert_eq!(base_names(e.bases()), ["B", "EFieldType"]);
    assert_eq!(base_names(b.bases()), ["ExpandableEnum", "BFieldType"]);
    assert_eq!(
        base_names(e.mro()),
        ["B", "ExpandableEnum", "FieldBase", "BFieldType", "EFieldType"]
    );

    assert!(e["F1"].has_field_type(&b_type));
    assert!(!e["F1"].has_field_type(&e_type));
    assert!(e["F2"].has_field_type(&b_type));
    assert!(e["F2"].has_field_type(&e_type));
}

/// When several field types provide the same property, the nearest in linearization order
/// answers.
#[test]
fn nearest_field_type_wins() {
    let first = constant("First", "origin", "first");
    let second = constant("Second", "origin", "second");

    let e = ExpandableEnum::define("E").mixin(first).mixin(second).field("F", 0).build().unwrap();
    assert_eq!(e["F"].property("origin").unwrap(), FieldValue::from("first"));

    let b = ExpandableEnum::define("B").mixin(constant("Outer", "origin", "outer")).build().unwrap();
    let e = b.extend("E").mixin(constant("Inner", "origin", "inner")).field("F", 0).build().unwrap();
    assert_eq!(e["F"].property("origin").unwrap(), FieldValue::from("outer"));
}

/// Renders `<name>: <value>` instead of the default parenthesized form.
fn plain_rendering() -> FieldTypeRef {
    DerivedField::new("Error")
        .describe_with(|field| format!("{}: {}", field.name(), field.value()))
        .into_ref()
}

/// A mixin linearizes after `FieldBase`, so the default rendering still wins.
#[test]
fn mixin_rendering_follows_field_base() {
    let e = ExpandableEnum::define("GenericError")
        .mixin(plain_rendering())
        .field("CONNECTION_DROPPED", "472: Connection has been dropped")
        .build()
        .unwrap();

    assert_eq!(base_names(e.mro()), ["ExpandableEnum", "FieldBase", "Error"]);
    assert_eq!(
        e["CONNECTION_DROPPED"].to_string(),
        "(GenericError.CONNECTION_DROPPED: 472: Connection has been dropped)"
    );
}

/// A selected field type is injected ahead of `FieldBase` and replaces the default rendering.
#[test]
fn selected_field_type_rendering() {
    let e = ExpandableEnum::define("GenericError")
        .field_type(plain_rendering())
        .field("CONNECTION_DROPPED", "472: Connection has been dropped")
        .build()
        .unwrap();

    assert_eq!(base_names(e.mro()), ["Error", "ExpandableEnum", "FieldBase"]);
    assert_eq!(
        e["CONNECTION_DROPPED"].to_string(),
        "GenericError.CONNECTION_DROPPED: 472: Connection has been dropped"
    );

    let derived = e.extend("SpecializedError").field("OUT_OF_FUNDS", "3: no funds").build().unwrap();
    assert_eq!(derived["OUT_OF_FUNDS"].to_string(), "SpecializedError.OUT_OF_FUNDS: 3: no funds");
}

/// Property names are listed in registration order.
#[test]
fn derived_field_property_names() {
    let derived = DerivedField::new("Error")
        .property("code", |_| Ok(FieldValue::None))
        .property("description", |_| Ok(FieldValue::None));
    assert_eq!(derived.type_name(), "Error");
    assert_eq!(derived.property_names(), ["code", "description"]);
    assert!(FieldBase.property_names().is_empty());
}

// =============================================================================
// 4. Field-Type Selector
// =============================================================================

/// A selected field type no base provides is injected as the first base.
#[test]
fn selected_field_type_is_injected_first() {
    let mut tracer = RecordingTracer::new();
    let e = ExpandableEnum::define("E")
        .field_type(coded_message())
        .field("F1", "1: one")
        .build_with(&mut tracer)
        .unwrap();

    assert_eq!(base_names(e.bases()), ["CodedMessage", "ExpandableEnum"]);
    assert_eq!(base_names(e.mro()), ["CodedMessage", "ExpandableEnum", "FieldBase"]);
    assert!(same_field_type(e.field_type(), &coded_message()));
    assert_eq!(e["F1"].property("code").unwrap(), FieldValue::Int(1));
    assert!(tracer.events().contains(&DefineEvent::FieldTypeInjected {
        type_name: "E".to_owned(),
        field_type: "CodedMessage".to_owned(),
    }));
}

/// A selected field type an ancestor already carries is not injected again.
#[test]
fn selected_field_type_provided_by_base() {
    let b = ExpandableEnum::define("B").mixin(coded_message()).field("F1", "1: one").build().unwrap();

    let mut tracer = RecordingTracer::new();
    let e = b
        .extend("E")
        .field_type(coded_message())
        .field("F2", "2: two")
        .build_with(&mut tracer)
        .unwrap();

    assert_eq!(base_names(e.bases()), ["B"]);
    assert!(
        !tracer
            .events()
            .iter()
            .any(|event| matches!(event, DefineEvent::FieldTypeInjected { .. }))
    );
}

/// The selector is not inherited: a derived type without one falls back to the default.
#[test]
fn selector_is_not_inherited() {
    let b = ExpandableEnum::define("B").field_type(coded_message()).field("F1", "1: one").build().unwrap();
    let e = b.extend("E").field("F2", "2: two").build().unwrap();

    assert!(same_field_type(e.field_type(), &FieldBase::shared()));
    assert_eq!(base_names(e.bases()), ["B"]);
    assert_eq!(e["F2"].property("code").unwrap(), FieldValue::Int(2));
}
