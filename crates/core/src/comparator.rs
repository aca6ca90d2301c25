//! Lexicographic comparator builder
//!
//! Every per-type ranking is an ordered list of named steps reduced left to
//! right: the first step that does not compare equal decides. Steps are named
//! so that a decision can be traced back to the rule that made it.
//!
//! Orderings follow one convention throughout: [`Ordering::Greater`] means
//! "better". [`Lexicographic::max_by`] returns the *first* best item, so ties
//! at every step fall back to input order.
//!
//! ```rust
//! use trackselect_core::comparator::Lexicographic;
//!
//! struct Track { within_limits: bool, bitrate: u32 }
//!
//! let ranking = Lexicographic::new()
//!     .then_prefer("within_limits", |t: &Track| t.within_limits)
//!     .then_by_key("bitrate", |t: &Track| t.bitrate);
//!
//! let tracks = [
//!     Track { within_limits: false, bitrate: 900 },
//!     Track { within_limits: true, bitrate: 300 },
//!     Track { within_limits: true, bitrate: 500 },
//! ];
//! assert_eq!(ranking.max_by(&tracks).map(|t| t.bitrate), Some(500));
//! assert_eq!(ranking.deciding_step(&tracks[0], &tracks[1]).map(|(name, _)| name), Some("within_limits"));
//! ```

use std::cmp::Ordering;

type CompareFn<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

struct Step<'a, T> {
    name: &'static str,
    compare: CompareFn<'a, T>,
}

/// Ordered list of named comparison steps.
pub struct Lexicographic<'a, T> {
    steps: Vec<Step<'a, T>>,
}

impl<'a, T: 'a> Default for Lexicographic<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: 'a> Lexicographic<'a, T> {
    /// An empty comparator; every pair compares equal.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step with an arbitrary comparison.
    pub fn then_with<F>(mut self, name: &'static str, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'a,
    {
        self.steps.push(Step {
            name,
            compare: Box::new(compare),
        });
        self
    }

    /// Append a step where a larger key is better.
    pub fn then_by_key<K, F>(self, name: &'static str, key: F) -> Self
    where
        K: Ord + 'a,
        F: Fn(&T) -> K + 'a,
    {
        self.then_with(name, move |a, b| key(a).cmp(&key(b)))
    }

    /// Append a step where a smaller key is better.
    pub fn then_by_key_reversed<K, F>(self, name: &'static str, key: F) -> Self
    where
        K: Ord + 'a,
        F: Fn(&T) -> K + 'a,
    {
        self.then_with(name, move |a, b| key(b).cmp(&key(a)))
    }

    /// Append a step where `true` is better than `false`.
    pub fn then_prefer<F>(self, name: &'static str, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        self.then_with(name, move |a, b| predicate(a).cmp(&predicate(b)))
    }

    /// Append steps only when `condition` holds.
    pub fn when(self, condition: bool, add: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            add(self)
        } else {
            self
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the comparator has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Compare two items.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.deciding_step(a, b)
            .map_or(Ordering::Equal, |(_, ordering)| ordering)
    }

    /// The first step that tells `a` and `b` apart, with its ordering.
    ///
    /// `None` when every step compares equal.
    pub fn deciding_step(&self, a: &T, b: &T) -> Option<(&'static str, Ordering)> {
        self.steps.iter().find_map(|step| match (step.compare)(a, b) {
            Ordering::Equal => None,
            ordering => Some((step.name, ordering)),
        })
    }

    /// The first maximal item.
    pub fn max_by<'b, I>(&self, items: I) -> Option<&'b T>
    where
        I: IntoIterator<Item = &'b T>,
        T: 'b,
    {
        let mut best: Option<&'b T> = None;
        for item in items {
            match best {
                Some(current) if self.compare(item, current) != Ordering::Greater => {}
                _ => best = Some(item),
            }
        }
        best
    }
}

impl<T> std::fmt::Debug for Lexicographic<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|step| step.name))
            .finish()
    }
}
