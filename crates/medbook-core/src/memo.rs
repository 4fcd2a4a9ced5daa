//! Dependency-keyed caching for derived values.

/// Caches the last value computed from a dependency tuple.
///
/// The value is recomputed only when the dependencies differ from the ones
/// it was computed with.
#[derive(Debug)]
pub struct Memo<D, T> {
    entry: Option<(D, T)>,
    computations: usize,
}

impl<D, T> Default for Memo<D, T> {
    fn default() -> Self {
        Self {
            entry: None,
            computations: 0,
        }
    }
}

impl<D: PartialEq, T> Memo<D, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&mut self, deps: D, compute: impl FnOnce(&D) -> T) -> &T {
        if self.entry.as_ref().is_some_and(|(cached, _)| *cached != deps) {
            self.entry = None;
        }
        if self.entry.is_none() {
            self.computations += 1;
        }
        let (_, value) = self.entry.get_or_insert_with(|| {
            let value = compute(&deps);
            (deps, value)
        });
        value
    }

    /// Number of times the value was (re)computed.
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
