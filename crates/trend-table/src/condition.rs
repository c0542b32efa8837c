//! Tri-State Condition Series
//!
//! A condition series flags, per sample, whether a monitored fault condition
//! is active. Samples derived from missing data are `Undefined`; any logical
//! combination involving an `Undefined` operand stays `Undefined`.

use crate::error::TableError;
use serde::{Deserialize, Serialize};

/// Per-sample condition state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tristate {
    True,
    False,
    Undefined,
}

impl Tristate {
    /// Logical AND with undefined propagation
    pub fn and(self, other: Tristate) -> Tristate {
        match (self, other) {
            (Tristate::Undefined, _) | (_, Tristate::Undefined) => Tristate::Undefined,
            (Tristate::True, Tristate::True) => Tristate::True,
            _ => Tristate::False,
        }
    }

    /// Logical OR with undefined propagation
    pub fn or(self, other: Tristate) -> Tristate {
        match (self, other) {
            (Tristate::Undefined, _) | (_, Tristate::Undefined) => Tristate::Undefined,
            (Tristate::False, Tristate::False) => Tristate::False,
            _ => Tristate::True,
        }
    }

    /// Logical NOT; undefined stays undefined
    pub fn negate(self) -> Tristate {
        match self {
            Tristate::True => Tristate::False,
            Tristate::False => Tristate::True,
            Tristate::Undefined => Tristate::Undefined,
        }
    }

    pub fn is_true(self) -> bool {
        self == Tristate::True
    }

    pub fn is_defined(self) -> bool {
        self != Tristate::Undefined
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        value.map(Tristate::from).unwrap_or(Tristate::Undefined)
    }
}

/// Sequence of tri-state flags aligned with the rows of a sample table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSeries {
    values: Vec<Tristate>,
}

impl ConditionSeries {
    /// Create a series from explicit states
    pub fn new(values: Vec<Tristate>) -> Self {
        Self { values }
    }

    /// Create a fully defined series from plain booleans
    pub fn from_bools(values: &[bool]) -> Self {
        values.iter().map(|&v| Tristate::from(v)).collect()
    }

    /// Create a series from 0/1 integers (any non-zero value is true)
    pub fn from_flags(values: &[u8]) -> Self {
        values.iter().map(|&v| Tristate::from(v != 0)).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Tristate] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<Tristate> {
        self.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Tristate> + '_ {
        self.values.iter().copied()
    }

    /// Number of `True` samples
    pub fn count_true(&self) -> usize {
        self.values.iter().filter(|v| v.is_true()).count()
    }

    /// Number of samples that are not `Undefined`
    pub fn count_defined(&self) -> usize {
        self.values.iter().filter(|v| v.is_defined()).count()
    }

    /// Row indices of `True` samples, ascending
    pub fn true_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_true())
            .map(|(i, _)| i)
    }

    /// Element-wise AND
    pub fn and(&self, other: &ConditionSeries) -> Result<ConditionSeries, TableError> {
        self.zip_with(other, "and", Tristate::and)
    }

    /// Element-wise OR
    pub fn or(&self, other: &ConditionSeries) -> Result<ConditionSeries, TableError> {
        self.zip_with(other, "or", Tristate::or)
    }

    /// Element-wise NOT
    pub fn negate(&self) -> ConditionSeries {
        self.iter().map(Tristate::negate).collect()
    }

    fn zip_with(
        &self,
        other: &ConditionSeries,
        op: &str,
        f: impl Fn(Tristate, Tristate) -> Tristate,
    ) -> Result<ConditionSeries, TableError> {
        if self.len() != other.len() {
            return Err(TableError::LengthMismatch {
                context: format!("condition {}", op),
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(&a, &b)| f(a, b))
            .collect())
    }
}

impl FromIterator<Tristate> for ConditionSeries {
    fn from_iter<I: IntoIterator<Item = Tristate>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_propagates() {
        assert_eq!(Tristate::Undefined.and(Tristate::False), Tristate::Undefined);
        assert_eq!(Tristate::True.or(Tristate::Undefined), Tristate::Undefined);
        assert_eq!(Tristate::Undefined.negate(), Tristate::Undefined);
        assert_eq!(Tristate::True.and(Tristate::True), Tristate::True);
        assert_eq!(Tristate::True.and(Tristate::False), Tristate::False);
        assert_eq!(Tristate::False.or(Tristate::False), Tristate::False);
    }

    #[test]
    fn test_series_counts() {
        let series = ConditionSeries::new(vec![
            Tristate::True,
            Tristate::Undefined,
            Tristate::False,
            Tristate::True,
        ]);
        assert_eq!(series.count_true(), 2);
        assert_eq!(series.count_defined(), 3);
        assert_eq!(series.true_indices().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_and_length_mismatch() {
        let a = ConditionSeries::from_flags(&[1, 0, 1]);
        let b = ConditionSeries::from_flags(&[1, 1]);
        assert!(matches!(a.and(&b), Err(TableError::LengthMismatch { .. })));
    }

    #[test]
    fn test_and_or_negate() {
        let a = ConditionSeries::from_flags(&[1, 1, 0, 0]);
        let b = ConditionSeries::from_flags(&[1, 0, 1, 0]);
        assert_eq!(a.and(&b).unwrap(), ConditionSeries::from_flags(&[1, 0, 0, 0]));
        assert_eq!(a.or(&b).unwrap(), ConditionSeries::from_flags(&[1, 1, 1, 0]));
        assert_eq!(a.negate(), ConditionSeries::from_flags(&[0, 0, 1, 1]));
    }

    fn tristate() -> impl proptest::strategy::Strategy<Value = Tristate> {
        use proptest::prelude::*;
        prop_oneof![
            Just(Tristate::True),
            Just(Tristate::False),
            Just(Tristate::Undefined),
        ]
    }

    proptest::proptest! {
        #[test]
        fn property_combined_series_defined_only_where_both_are(
            pairs in proptest::collection::vec((tristate(), tristate()), 0..100),
        ) {
            let a: ConditionSeries = pairs.iter().map(|p| p.0).collect();
            let b: ConditionSeries = pairs.iter().map(|p| p.1).collect();
            let both = pairs.iter().filter(|(x, y)| x.is_defined() && y.is_defined()).count();

            let and = a.and(&b).unwrap();
            let or = a.or(&b).unwrap();
            proptest::prop_assert_eq!(and.count_defined(), both);
            proptest::prop_assert_eq!(or.count_defined(), both);
            proptest::prop_assert!(and.count_true() <= or.count_true());
            proptest::prop_assert_eq!(a.negate().count_true() + a.count_true(), a.count_defined());
        }
    }
}
