//! Field-level change detection between two desired states.
//!
//! A resource lists its declarative fields once, each with a comparator, and the table reports
//! which names differ between the prior and the new value.
//!
//! ```rust
//! use reconcile_framework::changes::FieldTable;
//!
//! struct Limits { memory: u32, timeout: u32 }
//!
//! static LIMITS: FieldTable<Limits> = FieldTable::new(&[
//!     ("memory", |a, b| a.memory != b.memory),
//!     ("timeout", |a, b| a.timeout != b.timeout),
//! ]);
//!
//! let changed = LIMITS.changed(
//!     &Limits { memory: 256, timeout: 5000 },
//!     &Limits { memory: 512, timeout: 5000 },
//! );
//! assert_eq!(changed.into_iter().collect::<Vec<_>>(), vec!["memory"]);
//! ```

use std::collections::BTreeSet;

/// Returns `true` when the field differs between the two values.
pub type FieldComparator<T> = fn(&T, &T) -> bool;

/// A static list of named fields and how to compare them.
pub struct FieldTable<T: 'static> {
    fields: &'static [(&'static str, FieldComparator<T>)],
}

impl<T: 'static> FieldTable<T> {
    pub const fn new(fields: &'static [(&'static str, FieldComparator<T>)]) -> Self {
        Self { fields }
    }

    /// Names of every field whose comparator reports a difference.
    pub fn changed(&self, old: &T, new: &T) -> BTreeSet<&'static str> {
        self.fields
            .iter()
            .filter(|(_, differs)| differs(old, new))
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Sample {
        a: u8,
        b: &'static str,
        c: Vec<u8>,
    }

    static SAMPLE: FieldTable<Sample> = FieldTable::new(&[
        ("a", |x, y| x.a != y.a),
        ("b", |x, y| x.b != y.b),
        ("c", |x, y| x.c != y.c),
    ]);

    #[test]
    fn test_identical_values_report_nothing() {
        let s = Sample {
            a: 1,
            b: "x",
            c: vec![1],
        };
        assert!(SAMPLE.changed(&s, &s.clone()).is_empty());
    }

    #[test]
    fn test_reports_only_differing_fields() {
        let old = Sample {
            a: 1,
            b: "x",
            c: vec![1],
        };
        let new = Sample {
            a: 2,
            c: vec![1, 2],
            ..old.clone()
        };
        let changed = SAMPLE.changed(&old, &new);
        assert_eq!(changed, BTreeSet::from(["a", "c"]));
        assert_eq!(SAMPLE.names().count(), 3);
    }
}
