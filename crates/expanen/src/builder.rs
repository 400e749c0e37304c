//! Definition of new enum types.
//!
//! [`EnumBuilder`] collects a definition (name, bases, field-type selector, ordered member
//! declarations) and [`EnumBuilder::build`] turns it into a published [`EnumType`]:
//!
//! 1. Resolve the effective field type. When no base provides it, it is injected as the
//!    first base so every field of the new type carries it.
//! 2. Linearize the bases (C3) to get the full ancestor list.
//! 3. Collect every field declared by any enum ancestor, through every branch.
//! 4. Check each declaration, in order, against the collected fields and the declarations
//!    before it: neither its bare name nor its value may repeat.
//! 5. Materialize each declaration as a field of the new type, `"<Type>.<member>"`.
//!
//! Definition is atomic. Fields are materialized as the declarations are checked, but they
//! only become reachable when the descriptor is published; a rejected definition leaves
//! nothing behind.

use std::sync::Arc;

use ahash::AHashSet;
use indexmap::IndexMap;

use crate::{
    enum_type::{Base, EnumId, EnumParts, EnumType},
    error::{ConflictKind, DefineError, DuplicateFieldConflict},
    field::{Field, QUALIFIER_SEPARATOR},
    field_type::{FieldBase, FieldTypeRef},
    limits::DefineLimits,
    tracer::{DefineTracer, NoopTracer},
    value::FieldValue,
};

/// Name reserved for the field-type selector. Never a member name.
pub const FIELD_TYPE_SELECTOR: &str = "_field_type";

/// Definition of a new enum type, in progress.
///
/// Obtained from [`ExpandableEnum::define`](crate::ExpandableEnum::define) or
/// [`EnumType::extend`].
#[derive(Debug)]
#[must_use = "an enum type is only defined once `build` is called"]
pub struct EnumBuilder {
    name: String,
    bases: Vec<Base>,
    field_type: Option<FieldTypeRef>,
    declarations: Vec<(String, FieldValue)>,
    limits: DefineLimits,
}

impl EnumBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            field_type: None,
            declarations: Vec::new(),
            limits: DefineLimits::default(),
        }
    }

    /// Adds an enum base. Its fields, and those of all its ancestors, are inherited.
    pub fn base(mut self, base: &Arc<EnumType>) -> Self {
        self.bases.push(Base::Enum(Arc::clone(base)));
        self
    }

    /// Adds a field-type mixin base.
    pub fn mixin(mut self, field_type: FieldTypeRef) -> Self {
        self.bases.push(Base::FieldType(field_type));
        self
    }

    /// Overrides the field-type selector (defaults to [`FieldBase`]).
    pub fn field_type(mut self, field_type: FieldTypeRef) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Declares a member. Declaration order is kept.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.declarations.push((name.into(), value.into()));
        self
    }

    /// Declares several members, in iteration order.
    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.declarations
            .extend(fields.into_iter().map(|(name, value)| (name.into(), value.into())));
        self
    }

    /// Replaces the limits applied while linearizing.
    pub fn limits(mut self, limits: DefineLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Defines the enum type.
    pub fn build(self) -> Result<Arc<EnumType>, DefineError> {
        self.build_with(&mut NoopTracer)
    }

    /// Defines the enum type, reporting each step to `tracer`.
    pub fn build_with(self, tracer: &mut impl DefineTracer) -> Result<Arc<EnumType>, DefineError> {
        tracer.on_define_start(&self.name, &self.bases);
        match self.define(tracer) {
            Ok(ty) => {
                tracer.on_finalized(&ty);
                tracing::debug!(type_name = ty.name(), fields = ty.fields().len(), "expandable enum defined");
                Ok(ty)
            }
            Err(error) => {
                tracer.on_rejected(&error);
                tracing::debug!(type_name = error.type_name(), %error, "expandable enum rejected");
                Err(error)
            }
        }
    }

    fn define(self, tracer: &mut impl DefineTracer) -> Result<Arc<EnumType>, DefineError> {
        let Self {
            name,
            mut bases,
            field_type,
            declarations,
            limits,
        } = self;

        let field_type = field_type.unwrap_or_else(FieldBase::shared);
        if !bases.iter().any(|base| base.provides(&field_type)) {
            tracer.on_field_type_injected(&name, field_type.as_ref());
            bases.insert(0, Base::FieldType(Arc::clone(&field_type)));
        }

        let mro = compute_c3_mro(&name, &bases, limits)?;
        tracer.on_linearized(&name, &mro);

        let id = EnumId::next();
        let type_name: Arc<str> = Arc::from(name.as_str());
        let lineage: Arc<[EnumId]> = std::iter::once(id)
            .chain(mro.iter().filter_map(Base::as_enum).map(|ancestor| ancestor.id()))
            .collect();
        let capabilities: Arc<[FieldTypeRef]> = mro.iter().filter_map(Base::as_field_type).cloned().collect();

        // every enum appears once in the linearization, so every inherited field is seen once
        let inherited: Vec<&Field> = mro
            .iter()
            .filter_map(Base::as_enum)
            .flat_map(|ancestor| ancestor.fields())
            .collect();

        let mut fields: IndexMap<String, Field> = IndexMap::with_capacity(declarations.len());
        for (member, value) in declarations {
            check_member_name(&name, &member)?;

            let existing = inherited.iter().copied().chain(fields.values());
            if let Some(conflict) = find_conflict(&name, &member, &value, existing) {
                tracer.on_conflict(&conflict);
                return Err(conflict.into());
            }

            let field = Field::new(&type_name, &member, value, &lineage, &capabilities);
            tracer.on_field_bound(&field);
            fields.insert(member, field);
        }

        let depth = extension_depth(&bases);
        Ok(Arc::new(EnumType::from_parts(EnumParts {
            id,
            name: type_name,
            bases,
            mro,
            field_type,
            fields,
            lineage,
            capabilities,
            depth,
        })))
    }
}

/// Rejects names that cannot be members: empty, qualified, or reserved for bookkeeping.
fn check_member_name(type_name: &str, member: &str) -> Result<(), DefineError> {
    if member.is_empty() || member.contains(QUALIFIER_SEPARATOR) {
        return Err(DefineError::InvalidName {
            type_name: type_name.to_owned(),
            field_name: member.to_owned(),
        });
    }
    if member.starts_with("__") || member == FIELD_TYPE_SELECTOR {
        return Err(DefineError::ReservedName {
            type_name: type_name.to_owned(),
            field_name: member.to_owned(),
        });
    }
    Ok(())
}

/// Compares one declaration against every existing field, in order.
///
/// The first existing field sharing the bare name or the value is reported; a field that
/// shares both is reported as a name conflict.
fn find_conflict<'a>(
    type_name: &str,
    member: &str,
    value: &FieldValue,
    existing: impl Iterator<Item = &'a Field>,
) -> Option<DuplicateFieldConflict> {
    for field in existing {
        let kind = if field.bare_name() == member {
            ConflictKind::Name
        } else if field.value() == value {
            ConflictKind::Value
        } else {
            tracing::trace!(type_name, member, against = field.name(), "no conflict");
            continue;
        };
        return Some(DuplicateFieldConflict {
            type_name: type_name.to_owned(),
            field_name: member.to_owned(),
            field_value: value.clone(),
            existing_name: field.name().to_owned(),
            existing_value: field.value().clone(),
            kind,
        });
    }
    None
}

// ============================================================================
// C3 Linearization
// ============================================================================

/// Depth of a type defined with `bases`: one more than its deepest enum base.
fn extension_depth(bases: &[Base]) -> usize {
    bases
        .iter()
        .filter_map(Base::as_enum)
        .map(|base| base.depth() + 1)
        .max()
        .unwrap_or_default()
}

/// Computes the C3 linearization of a new type's bases.
///
/// The C3 algorithm merges the linearizations of all bases with the list of bases itself
/// to produce a consistent ancestor order (the order Python uses for its MRO). Field types
/// have no ancestors of their own, so each linearizes to itself.
///
/// # Returns
/// The linearized ancestors, nearest first, NOT including the new type, or an error if the
/// bases repeat, are nested too deep, or cannot be ordered consistently.
pub(crate) fn compute_c3_mro(type_name: &str, bases: &[Base], limits: DefineLimits) -> Result<Vec<Base>, DefineError> {
    let mut seen = AHashSet::with_capacity(bases.len());
    for base in bases {
        if !seen.insert(base.key()) {
            return Err(DefineError::DuplicateBase {
                type_name: type_name.to_owned(),
                base: base.name().to_owned(),
            });
        }
    }

    if extension_depth(bases) > limits.max_inheritance_depth {
        return Err(DefineError::InheritanceTooDeep {
            type_name: type_name.to_owned(),
            limit: limits.max_inheritance_depth,
        });
    }

    let mut linearizations: Vec<Vec<Base>> = Vec::with_capacity(bases.len() + 1);
    linearizations.extend(bases.iter().map(Base::linearization));
    // the list of bases itself is the last sequence to merge
    linearizations.push(bases.to_vec());

    let mut result: Vec<Base> = Vec::new();
    loop {
        linearizations.retain(|lin| !lin.is_empty());
        if linearizations.is_empty() {
            break;
        }

        // a good head does not appear in the tail of any list
        let found = linearizations.iter().map(|lin| lin[0].key()).find(|candidate| {
            !linearizations
                .iter()
                .any(|other| other[1..].iter().any(|base| base.key() == *candidate))
        });
        let Some(next) = found else {
            return Err(DefineError::InconsistentMro {
                type_name: type_name.to_owned(),
                bases: bases.iter().map(|base| base.name().to_owned()).collect(),
            });
        };

        let mut head = None;
        for lin in &mut linearizations {
            if lin[0].key() == next {
                head = Some(lin.remove(0));
            }
        }
        result.extend(head);

        if result.len() > limits.max_mro_length {
            return Err(DefineError::MroTooLong {
                type_name: type_name.to_owned(),
                limit: limits.max_mro_length,
            });
        }
    }

    Ok(result)
}
