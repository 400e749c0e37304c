/// Maximum depth of a single inheritance path, counted in enum extensions from the root.
///
/// Keeps pathological hierarchies (thousands of nested extensions) from making every
/// definition linearize and scan an unbounded ancestor chain.
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 1000;

/// Maximum length of the linearized ancestor list of any enum type.
///
/// Bounds the output of C3 linearization so wide diamond compositions cannot blow up.
pub const DEFAULT_MAX_MRO_LENGTH: usize = 2600;

/// Limits applied while defining an enum type.
///
/// Use `DefineLimits::default()` for the defaults, or adjust with the builder setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DefineLimits {
    /// Deepest an enum type may sit below the root, counting only enum bases. The root is at
    /// depth 0 and a type one deeper than its deepest enum base; mixins add nothing.
    pub max_inheritance_depth: usize,
    /// Longest linearization the new type may end up with.
    pub max_mro_length: usize,
}

impl Default for DefineLimits {
    fn default() -> Self {
        Self {
            max_inheritance_depth: DEFAULT_MAX_INHERITANCE_DEPTH,
            max_mro_length: DEFAULT_MAX_MRO_LENGTH,
        }
    }
}

impl DefineLimits {
    /// Creates limits with the default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum inheritance depth.
    #[must_use]
    pub fn max_inheritance_depth(mut self, limit: usize) -> Self {
        self.max_inheritance_depth = limit;
        self
    }

    /// Sets the maximum linearization length.
    #[must_use]
    pub fn max_mro_length(mut self, limit: usize) -> Self {
        self.max_mro_length = limit;
        self
    }
}
