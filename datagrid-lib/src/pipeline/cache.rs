//! Dependency-tracked memo cell.

/// Monotonic change counter for one piece of grid state.
///
/// Stages compare revisions instead of deep-comparing row sets or filter maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Revision(u64);

impl Revision {
    /// Advances to a new revision.
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A pure computation's last result together with the inputs it saw.
///
/// [`Memo::get_or_compute`] reruns the computation only when the inputs
/// differ from the last call.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
    computations: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entry: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `inputs`, computing it if they changed.
    pub fn get_or_compute(&mut self, inputs: K, compute: impl FnOnce() -> V) -> V {
        if let Some((seen, value)) = &self.entry
            && *seen == inputs
        {
            return value.clone();
        }
        let value = compute();
        self.entry = Some((inputs, value.clone()));
        self.computations += 1;
        value
    }

    /// Last computed value, regardless of input freshness.
    pub fn peek(&self) -> Option<&V> {
        self.entry.as_ref().map(|(_, v)| v)
    }

    /// Forces the next call to recompute.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// How many times the computation has run.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
