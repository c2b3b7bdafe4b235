//! Parser configuration

/// Knobs for [`parse_with`](crate::parse_with).
///
/// ```
/// use ppl::ParseOptions;
///
/// let opts = ParseOptions::new().with_recovery(false).with_max_depth(64);
/// assert!(!opts.recovery());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    recovery: bool,
    max_depth: usize,
    max_input_len: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recovery: true,
            max_depth: 200,
            max_input_len: 1 << 20,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recovery off: stop at the first syntax error.
    pub fn strict() -> Self {
        Self::default().with_recovery(false)
    }

    pub fn with_recovery(mut self, recovery: bool) -> Self {
        self.recovery = recovery;
        self
    }

    /// Deepest allowed nesting of parentheses and function calls.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Longest accepted query, in bytes.
    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }

    pub fn recovery(&self) -> bool {
        self.recovery
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_input_len(&self) -> usize {
        self.max_input_len
    }
}
