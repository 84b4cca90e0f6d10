// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Sort keys and composite comparison.
//!
//! Every list presenter orders its items with the same model: an ordered
//! list of [`SortingKey`]s read from a shared [`OrderingStep`], turned into
//! a [`CompositeComparer`] where the first key is primary and each later key
//! only breaks ties left by the ones before it.
//!
//! # Absent values
//!
//! Missing relations, empty strings and unknown numbers always sort first,
//! whichever direction is requested. The helpers in this module take the
//! direction as a parameter rather than reversing an ascending result so
//! that this holds.

use std::{cell::RefCell, cmp::Ordering, fmt, rc::Rc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Publisher,
    Year,
    TrackNumber,
    DiscNumber,
    Duration,
    DateAdded,
    PlayCount,
    LastPlayed,
    Rating,
    Bitrate,
    Filename,
    TrackCount,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingKey {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortingKey {
    pub const fn ascending(key: SortKey) -> Self {
        Self { key, ascending: true }
    }

    pub const fn descending(key: SortKey) -> Self {
        Self { key, ascending: false }
    }
}

/// The sort keys currently in force, owned by whoever drives navigation.
///
/// Presenters hold a clone and read it on every sort, so changing the keys
/// here takes effect on the next [`sort`](crate::presenter::ListPresenter::sort)
/// without notifying anyone.
#[derive(Clone, Default)]
pub struct OrderingStep(Rc<RefCell<Vec<SortingKey>>>);

impl OrderingStep {
    pub fn new(keys: Vec<SortingKey>) -> Self {
        Self(Rc::new(RefCell::new(keys)))
    }

    pub fn keys(&self) -> Vec<SortingKey> {
        self.0.borrow().clone()
    }

    pub fn set(&self, keys: Vec<SortingKey>) {
        *self.0.borrow_mut() = keys;
    }

    pub fn has_random(&self) -> bool {
        self.0.borrow().iter().any(|k| k.key == SortKey::Random)
    }
}

impl fmt::Debug for OrderingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OrderingStep").field(&self.0.borrow()).finish()
    }
}

type Comparison<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

/// Chains per-key comparisons; the first non-equal result wins.
pub struct CompositeComparer<'a, T> {
    comparisons: Vec<Comparison<'a, T>>,
}

impl<T> Default for CompositeComparer<'_, T> {
    fn default() -> Self {
        Self { comparisons: Vec::new() }
    }
}

impl<'a, T> CompositeComparer<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, comparison: impl Fn(&T, &T) -> Ordering + 'a) -> Self {
        self.comparisons.push(Box::new(comparison));
        self
    }

    pub fn push(&mut self, comparison: impl Fn(&T, &T) -> Ordering + 'a) {
        self.comparisons.push(Box::new(comparison));
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.comparisons
            .iter()
            .map(|comparison| comparison(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl<T> fmt::Debug for CompositeComparer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeComparer")
            .field("keys", &self.comparisons.len())
            .finish()
    }
}

/// Compares two present values in the requested direction.
pub fn compare_value<T: Ord>(a: T, b: T, ascending: bool) -> Ordering {
    if ascending { a.cmp(&b) } else { b.cmp(&a) }
}

/// Compares optional values; `None` sorts first in both directions.
pub fn compare_nullable<T: Ord>(a: Option<T>, b: Option<T>, ascending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_value(a, b, ascending),
    }
}

/// Compares numbers treating zero as absent, so it sorts first in both
/// directions.
pub fn compare_number<T: Ord + Default>(a: T, b: T, ascending: bool) -> Ordering {
    let zero = T::default();
    let a = (a != zero).then_some(a);
    let b = (b != zero).then_some(b);
    compare_nullable(a, b, ascending)
}

/// Case-insensitive text comparison treating the empty string as absent.
pub fn compare_text(a: &str, b: &str, ascending: bool) -> Ordering {
    let a = (!a.is_empty()).then_some(a);
    let b = (!b.is_empty()).then_some(b);
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let folded = a
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase));
            // Fall back to the raw text so "abc" and "ABC" still order deterministically
            let ordering = folded.then_with(|| a.cmp(b));
            if ascending { ordering } else { ordering.reverse() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_non_equal_comparison_wins() {
        let comparer = CompositeComparer::new()
            .then(|a: &(i32, i32), b: &(i32, i32)| a.0.cmp(&b.0))
            .then(|a: &(i32, i32), b: &(i32, i32)| b.1.cmp(&a.1));

        let mut values = vec![(2, 1), (1, 1), (2, 5), (1, 9)];
        values.sort_by(|a, b| comparer.compare(a, b));

        assert_eq!(values, vec![(1, 9), (1, 1), (2, 5), (2, 1)]);
    }

    #[test]
    fn test_full_tie_keeps_insertion_order() {
        let comparer = CompositeComparer::new().then(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));

        let mut values = vec![(1, 'c'), (0, 'x'), (1, 'a'), (1, 'b')];
        values.sort_by(|a, b| comparer.compare(a, b));

        assert_eq!(values, vec![(0, 'x'), (1, 'c'), (1, 'a'), (1, 'b')]);
    }

    #[test]
    fn test_empty_comparer_treats_everything_as_equal() {
        let comparer: CompositeComparer<'_, i32> = CompositeComparer::new();
        assert!(comparer.is_empty());
        assert_eq!(comparer.compare(&1, &2), Ordering::Equal);
    }

    #[test]
    fn test_nulls_sort_first_in_both_directions() {
        let mut values = vec![Some(3), None, Some(1)];
        values.sort_by(|a, b| compare_nullable(*a, *b, true));
        assert_eq!(values, vec![None, Some(1), Some(3)]);

        values.sort_by(|a, b| compare_nullable(*a, *b, false));
        assert_eq!(values, vec![None, Some(3), Some(1)]);
    }

    #[test]
    fn test_zero_sorts_first_in_both_directions() {
        let mut values = vec![5u32, 0, 2];
        values.sort_by(|a, b| compare_number(*a, *b, true));
        assert_eq!(values, vec![0, 2, 5]);

        values.sort_by(|a, b| compare_number(*a, *b, false));
        assert_eq!(values, vec![0, 5, 2]);
    }

    #[test]
    fn test_empty_text_sorts_first_in_both_directions() {
        let mut values = vec!["beta", "", "Alpha"];
        values.sort_by(|a, b| compare_text(a, b, true));
        assert_eq!(values, vec!["", "Alpha", "beta"]);

        values.sort_by(|a, b| compare_text(a, b, false));
        assert_eq!(values, vec!["", "beta", "Alpha"]);
    }

    #[test]
    fn test_ordering_step_is_shared_between_clones() {
        let step = OrderingStep::new(vec![SortingKey::ascending(SortKey::Title)]);
        let reader = step.clone();

        step.set(vec![SortingKey::descending(SortKey::Random)]);

        assert_eq!(reader.keys(), vec![SortingKey::descending(SortKey::Random)]);
        assert!(reader.has_random());
    }
}
