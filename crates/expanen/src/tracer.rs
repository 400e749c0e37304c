//! Definition tracing infrastructure.
//!
//! Provides a trait-based tracer for enum definitions. When using [`NoopTracer`] (what
//! [`EnumBuilder::build`](crate::EnumBuilder::build) uses) every hook compiles away via
//! monomorphization.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (default) |
//! | [`StderrTracer`] | Human-readable definition log to stderr |
//! | [`RecordingTracer`] | Full event recording for assertions and post-mortem |
//! | [`LogTracer`] | Forwards every hook to `tracing` as structured events |
//!
//! Independently of the tracer passed in, the builder emits `tracing::trace!` events for
//! every individual field check.
//!
//! ```ignore
//! let mut tracer = RecordingTracer::new();
//! let ty = ExpandableEnum::define("E").field("F1", 123).build_with(&mut tracer)?;
//! assert!(matches!(tracer.events().last(), Some(DefineEvent::Finalized { .. })));
//! ```

use crate::{
    enum_type::{Base, EnumType},
    error::{DefineError, DuplicateFieldConflict},
    field::Field,
    field_type::FieldType,
};

/// Event emitted while defining an enum type.
///
/// Captured by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineEvent {
    /// A definition started.
    Start {
        type_name: String,
        /// Names of the declared bases, before any field-type injection.
        bases: Vec<String>,
    },
    /// The effective field type was not provided by any base and was added as the first base.
    FieldTypeInjected { type_name: String, field_type: String },
    /// The bases were linearized.
    Linearized {
        type_name: String,
        /// Names of the linearized ancestors, nearest first, the new type excluded.
        mro: Vec<String>,
    },
    /// A declaration passed the checks and was materialized.
    FieldBound { name: String, value: String },
    /// A declaration collided with an existing field.
    Conflict { message: String },
    /// The type was published.
    Finalized { type_name: String, field_count: usize },
    /// The definition was abandoned.
    Rejected { type_name: String, message: String },
}

/// Hooks called while an enum type is defined.
///
/// All methods have default no-op implementations; implementations override only the
/// hooks they care about.
pub trait DefineTracer: std::fmt::Debug {
    /// Called once before anything is checked.
    #[inline(always)]
    fn on_define_start(&mut self, _type_name: &str, _bases: &[Base]) {}

    /// Called when the effective field type is injected as an extra base.
    #[inline(always)]
    fn on_field_type_injected(&mut self, _type_name: &str, _field_type: &dyn FieldType) {}

    /// Called once the bases are linearized.
    ///
    /// # Arguments
    /// * `mro` - Linearized ancestors, nearest first, the new type excluded
    #[inline(always)]
    fn on_linearized(&mut self, _type_name: &str, _mro: &[Base]) {}

    /// Called after a declaration passed its checks and was materialized.
    #[inline(always)]
    fn on_field_bound(&mut self, _field: &Field) {}

    /// Called when a declaration collides with an existing field.
    #[inline(always)]
    fn on_conflict(&mut self, _conflict: &DuplicateFieldConflict) {}

    /// Called when the finished type is published.
    #[inline(always)]
    fn on_finalized(&mut self, _ty: &EnumType) {}

    /// Called when the definition is abandoned, for any reason.
    #[inline(always)]
    fn on_rejected(&mut self, _error: &DefineError) {}
}

fn base_names(bases: &[Base]) -> Vec<String> {
    bases.iter().map(|base| base.name().to_owned()).collect()
}

// ============================================================================
// NoopTracer
// ============================================================================

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl DefineTracer for NoopTracer {}

// ============================================================================
// StderrTracer
// ============================================================================

/// Tracer that prints a human-readable definition log to stderr.
///
/// ```text
/// >>> DEFINE SpecializedError  bases=[GenericError]
///     MRO    GenericError, ExpandableEnum, FieldBase
///   + SpecializedError.INCORRECT_PRICE = 2
///   + SpecializedError.OUT_OF_FUNDS = 3
/// <<< SpecializedError  fields=2
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTracer;

impl StderrTracer {
    /// Creates a new stderr tracer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DefineTracer for StderrTracer {
    fn on_define_start(&mut self, type_name: &str, bases: &[Base]) {
        eprintln!(">>> DEFINE {type_name}  bases=[{}]", base_names(bases).join(", "));
    }

    fn on_field_type_injected(&mut self, _type_name: &str, field_type: &dyn FieldType) {
        eprintln!("    INJECT {}", field_type.type_name());
    }

    fn on_linearized(&mut self, _type_name: &str, mro: &[Base]) {
        eprintln!("    MRO    {}", base_names(mro).join(", "));
    }

    fn on_field_bound(&mut self, field: &Field) {
        eprintln!("  + {} = {}", field.name(), field.value().py_repr());
    }

    fn on_conflict(&mut self, conflict: &DuplicateFieldConflict) {
        eprintln!("  ! {conflict}");
    }

    fn on_finalized(&mut self, ty: &EnumType) {
        eprintln!("<<< {}  fields={}", ty.name(), ty.fields().len());
    }

    fn on_rejected(&mut self, error: &DefineError) {
        eprintln!("<<< {} REJECTED", error.type_name());
    }
}

// ============================================================================
// RecordingTracer
// ============================================================================

/// Tracer that records every event in order.
///
/// Mostly useful in tests, to assert what a definition did and in which order.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<DefineEvent>,
}

impl RecordingTracer {
    /// Creates a new recording tracer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[DefineEvent] {
        &self.events
    }

    /// Consumes the tracer and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<DefineEvent> {
        self.events
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DefineTracer for RecordingTracer {
    fn on_define_start(&mut self, type_name: &str, bases: &[Base]) {
        self.events.push(DefineEvent::Start {
            type_name: type_name.to_owned(),
            bases: base_names(bases),
        });
    }

    fn on_field_type_injected(&mut self, type_name: &str, field_type: &dyn FieldType) {
        self.events.push(DefineEvent::FieldTypeInjected {
            type_name: type_name.to_owned(),
            field_type: field_type.type_name().to_owned(),
        });
    }

    fn on_linearized(&mut self, type_name: &str, mro: &[Base]) {
        self.events.push(DefineEvent::Linearized {
            type_name: type_name.to_owned(),
            mro: base_names(mro),
        });
    }

    fn on_field_bound(&mut self, field: &Field) {
        self.events.push(DefineEvent::FieldBound {
            name: field.name().to_owned(),
            value: field.value().py_repr(),
        });
    }

    fn on_conflict(&mut self, conflict: &DuplicateFieldConflict) {
        self.events.push(DefineEvent::Conflict {
            message: conflict.to_string(),
        });
    }

    fn on_finalized(&mut self, ty: &EnumType) {
        self.events.push(DefineEvent::Finalized {
            type_name: ty.name().to_owned(),
            field_count: ty.fields().len(),
        });
    }

    fn on_rejected(&mut self, error: &DefineError) {
        self.events.push(DefineEvent::Rejected {
            type_name: error.type_name().to_owned(),
            message: error.to_string(),
        });
    }
}

// ============================================================================
// LogTracer
// ============================================================================

/// Tracer that forwards every hook to the `tracing` crate.
///
/// Successful steps are `debug!` events, conflicts and rejections are `warn!` events, all
/// under the `expanen::define` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl DefineTracer for LogTracer {
    fn on_define_start(&mut self, type_name: &str, bases: &[Base]) {
        tracing::debug!(target: "expanen::define", type_name, bases = ?base_names(bases), "define start");
    }

    fn on_field_type_injected(&mut self, type_name: &str, field_type: &dyn FieldType) {
        tracing::debug!(
            target: "expanen::define",
            type_name,
            field_type = field_type.type_name(),
            "field type injected as base"
        );
    }

    fn on_linearized(&mut self, type_name: &str, mro: &[Base]) {
        tracing::debug!(target: "expanen::define", type_name, mro = ?base_names(mro), "bases linearized");
    }

    fn on_field_bound(&mut self, field: &Field) {
        tracing::debug!(target: "expanen::define", field = field.name(), value = %field.value(), "field bound");
    }

    fn on_conflict(&mut self, conflict: &DuplicateFieldConflict) {
        tracing::warn!(
            target: "expanen::define",
            type_name = %conflict.type_name,
            field = %conflict.field_name,
            existing = %conflict.existing_name,
            kind = %conflict.kind,
            "duplicated enum field"
        );
    }

    fn on_finalized(&mut self, ty: &EnumType) {
        tracing::debug!(target: "expanen::define", type_name = ty.name(), fields = ty.fields().len(), "finalized");
    }

    fn on_rejected(&mut self, error: &DefineError) {
        tracing::warn!(target: "expanen::define", type_name = error.type_name(), %error, "definition rejected");
    }
}
