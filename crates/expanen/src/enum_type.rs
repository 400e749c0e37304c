//! Expandable enum types.
//!
//! `EnumType` is the descriptor of one defined enum (created by [`EnumBuilder`]).
//! `ExpandableEnum` is the root every enum type derives from.
//!
//! # Member lookup
//!
//! - Own fields are checked first, then each enum ancestor in linearization order
//! - An inherited member resolves to the ancestor's field itself, never to a copy
//! - Descriptors are immutable once published; there is no way to add or remove a member

use std::{
    fmt,
    ops::Index,
    sync::{
        Arc, LazyLock,
        atomic::{AtomicU64, Ordering},
    },
};

use indexmap::IndexMap;

use crate::{
    builder::EnumBuilder,
    field::Field,
    field_type::{FieldBase, FieldTypeRef, field_type_key, same_field_type},
};

/// Process-unique identifier of an enum type.
///
/// Handed out from a global counter at definition time. Ids are never reused, so a field's
/// recorded lineage stays meaningful for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(u64);

static NEXT_ENUM_ID: AtomicU64 = AtomicU64::new(0);

impl EnumId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ENUM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A direct base or linearized ancestor of an enum type.
#[derive(Clone)]
pub enum Base {
    /// An enum type; its fields are inherited.
    Enum(Arc<EnumType>),
    /// A field-type mixin; its capabilities are composed onto fields.
    FieldType(FieldTypeRef),
}

/// Identity of a base, used when merging linearizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BaseKey {
    Enum(EnumId),
    FieldType(usize),
}

impl Base {
    /// Display name of the base.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(ty) => ty.name(),
            Self::FieldType(field_type) => field_type.type_name(),
        }
    }

    /// Returns the enum type, if this base is one.
    #[must_use]
    pub fn as_enum(&self) -> Option<&Arc<EnumType>> {
        match self {
            Self::Enum(ty) => Some(ty),
            Self::FieldType(_) => None,
        }
    }

    /// Returns the field type, if this base is one.
    #[must_use]
    pub fn as_field_type(&self) -> Option<&FieldTypeRef> {
        match self {
            Self::Enum(_) => None,
            Self::FieldType(field_type) => Some(field_type),
        }
    }

    /// Returns true if this base is `ty`.
    #[must_use]
    pub fn is_enum(&self, ty: &EnumType) -> bool {
        matches!(self, Self::Enum(own) if own.id() == ty.id())
    }

    /// Returns true if this base is `field_type`, or an enum type composing it.
    pub(crate) fn provides(&self, field_type: &FieldTypeRef) -> bool {
        match self {
            Self::Enum(ty) => ty.has_field_type(field_type),
            Self::FieldType(own) => same_field_type(own, field_type),
        }
    }

    pub(crate) fn key(&self) -> BaseKey {
        match self {
            Self::Enum(ty) => BaseKey::Enum(ty.id()),
            Self::FieldType(field_type) => BaseKey::FieldType(field_type_key(field_type)),
        }
    }

    /// This base followed by its own linearization.
    pub(crate) fn linearization(&self) -> Vec<Self> {
        match self {
            Self::Enum(ty) => std::iter::once(self.clone()).chain(ty.mro.iter().cloned()).collect(),
            Self::FieldType(_) => vec![self.clone()],
        }
    }
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(ty) => write!(f, "Enum({})", ty.name()),
            Self::FieldType(field_type) => write!(f, "FieldType({})", field_type.type_name()),
        }
    }
}

/// Descriptor of a defined expandable enum.
///
/// Shared as `Arc<EnumType>`; descendants keep their ancestors alive through their bases.
pub struct EnumType {
    id: EnumId,
    name: Arc<str>,
    /// Direct bases in declaration order, the injected field type first when there is one.
    bases: Vec<Base>,
    /// C3 linearization of the bases. Does NOT include the type itself.
    mro: Vec<Base>,
    /// The field-type selector in effect for this type.
    field_type: FieldTypeRef,
    /// Fields declared by this type, in declaration order.
    fields: IndexMap<String, Field>,
    /// Own id first, then every enum ancestor id in linearization order.
    lineage: Arc<[EnumId]>,
    /// Field types in linearization order.
    capabilities: Arc<[FieldTypeRef]>,
    /// Longest path of enum bases down to the root; the root is 0.
    depth: usize,
}

impl EnumType {
    /// Assembles a descriptor. Only the builder and the root call this, after validation.
    pub(crate) fn from_parts(parts: EnumParts) -> Self {
        Self {
            id: parts.id,
            name: parts.name,
            bases: parts.bases,
            mro: parts.mro,
            field_type: parts.field_type,
            fields: parts.fields,
            lineage: parts.lineage,
            capabilities: parts.capabilities,
            depth: parts.depth,
        }
    }

    /// Opens the definition of a new enum type extending this one.
    pub fn extend(self: &Arc<Self>, name: impl Into<String>) -> EnumBuilder {
        EnumBuilder::new(name).base(self)
    }

    /// Unique id of this type.
    #[must_use]
    pub fn id(&self) -> EnumId {
        self.id
    }

    /// The type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases, in order.
    #[must_use]
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Number of enum extensions between this type and the root, along the longest path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Linearized ancestors, nearest first. Does not include this type.
    #[must_use]
    pub fn mro(&self) -> &[Base] {
        &self.mro
    }

    /// The effective field type of this type.
    #[must_use]
    pub fn field_type(&self) -> &FieldTypeRef {
        &self.field_type
    }

    /// Field types composed onto this type's fields, nearest first.
    #[must_use]
    pub fn field_types(&self) -> &[FieldTypeRef] {
        &self.capabilities
    }

    /// Fields declared by this type, in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &Field> + DoubleEndedIterator {
        self.fields.values()
    }

    /// Every member reachable from this type: inherited fields first (root-most ancestor
    /// first), then this type's own fields. Each field appears once.
    pub fn members(&self) -> impl Iterator<Item = &Field> {
        self.mro
            .iter()
            .rev()
            .filter_map(Base::as_enum)
            .flat_map(|ancestor| ancestor.fields.values())
            .chain(self.fields.values())
    }

    /// Looks up a member by bare name, own fields first, then ancestors in linearization
    /// order. Repeated lookups return the same field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name).or_else(|| {
            self.mro
                .iter()
                .filter_map(Base::as_enum)
                .find_map(|ancestor| ancestor.fields.get(name))
        })
    }

    /// Returns true if a member named `name` is reachable from this type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns true if this type is `other` or derives from it.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        self.lineage.contains(&other.id)
    }

    /// Returns true if this type's fields carry `field_type`.
    #[must_use]
    pub fn has_field_type(&self, field_type: &FieldTypeRef) -> bool {
        self.capabilities.iter().any(|own| same_field_type(own, field_type))
    }
}

impl Index<&str> for EnumType {
    type Output = Field;

    /// Panics if no member named `name` is reachable from this type.
    fn index(&self, name: &str) -> &Field {
        match self.get(name) {
            Some(field) => field,
            None => panic!("enum '{}' has no member '{name}'", self.name),
        }
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EnumType {}

impl fmt::Display for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<enum '{}'>", self.name)
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bases", &self.bases)
            .field("fields", &self.fields.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Everything a descriptor is assembled from.
pub(crate) struct EnumParts {
    pub id: EnumId,
    pub name: Arc<str>,
    pub bases: Vec<Base>,
    pub mro: Vec<Base>,
    pub field_type: FieldTypeRef,
    pub fields: IndexMap<String, Field>,
    pub lineage: Arc<[EnumId]>,
    pub capabilities: Arc<[FieldTypeRef]>,
    pub depth: usize,
}

static ROOT: LazyLock<Arc<EnumType>> = LazyLock::new(|| {
    let field_type = FieldBase::shared();
    let id = EnumId::next();
    Arc::new(EnumType::from_parts(EnumParts {
        id,
        name: Arc::from(ExpandableEnum::NAME),
        bases: vec![Base::FieldType(Arc::clone(&field_type))],
        mro: vec![Base::FieldType(Arc::clone(&field_type))],
        capabilities: Arc::from([Arc::clone(&field_type)]),
        field_type,
        fields: IndexMap::new(),
        lineage: Arc::from([id]),
        depth: 0,
    }))
});

/// The root of every expandable enum hierarchy.
///
/// The root declares no members. Its single base is [`FieldBase`], injected the same way a
/// definition gets its field type when no base provides it; every enum therefore carries
/// the base field capabilities.
#[derive(Debug, Clone, Copy)]
pub struct ExpandableEnum;

impl ExpandableEnum {
    /// Name of the root type.
    pub const NAME: &'static str = "ExpandableEnum";

    /// The shared root descriptor.
    #[must_use]
    pub fn root() -> &'static Arc<EnumType> {
        &ROOT
    }

    /// Opens the definition of a new enum type deriving directly from the root.
    pub fn define(name: impl Into<String>) -> EnumBuilder {
        EnumBuilder::new(name).base(Self::root())
    }
}
