//! Ordered-list primitives shared by columns and cards.
//!
//! A list is *dense* when its `order` values are exactly `0..len`. Every
//! mutation in this module leaves the lists it touches dense and with
//! `order == index`.

use crate::domain::{card::Card, board::Column};

/// An element that carries its own position within a list
pub trait Ordered {
    fn order(&self) -> usize;
    fn set_order(&mut self, order: usize);
}

impl Ordered for Card {
    fn order(&self) -> usize {
        self.order
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

impl Ordered for Column {
    fn order(&self) -> usize {
        self.order
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

/// Where `move_within_or_between` inserts the item
pub enum Destination<'a, T> {
    /// Reinsert into the source list
    Same,
    /// Insert into another list
    Other(&'a mut Vec<T>),
}

/// Sets `order = index` for every element
pub fn renumber<T: Ordered>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order(index);
    }
}

/// Stable sort by the stored `order`
///
/// Ties keep their relative position, so a snapshot with duplicate orders
/// still normalizes deterministically.
pub fn sort_by_order<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.order());
}

/// Checks that the `order` values form a permutation of `0..len`
pub fn is_dense<T: Ordered>(items: &[T]) -> bool {
    let mut seen = vec![false; items.len()];
    for item in items {
        match seen.get_mut(item.order()) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Checks that every element's `order` equals its index
pub fn is_renumbered<T: Ordered>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.order() == index)
}

/// Removes the element at `from` and inserts it at `dest_index` of the
/// destination, clamped to `[0, destination.len()]`.
///
/// The clamp is applied after removal, so for `Destination::Same` an index
/// equal to the original length lands at the end. Both lists are renumbered.
/// Returns the final index, or `None` when `from` is out of bounds.
pub fn move_within_or_between<T: Ordered>(
    source: &mut Vec<T>,
    from: usize,
    destination: Destination<'_, T>,
    dest_index: usize,
) -> Option<usize> {
    if from >= source.len() {
        return None;
    }

    let item = source.remove(from);
    let index = match destination {
        Destination::Same => {
            let index = dest_index.min(source.len());
            source.insert(index, item);
            index
        }
        Destination::Other(dest) => {
            let index = dest_index.min(dest.len());
            dest.insert(index, item);
            renumber(dest);
            index
        }
    };
    renumber(source);

    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: char,
        order: usize,
    }

    impl Ordered for Item {
        fn order(&self) -> usize {
            self.order
        }

        fn set_order(&mut self, order: usize) {
            self.order = order;
        }
    }

    fn items(names: &str) -> Vec<Item> {
        names
            .chars()
            .enumerate()
            .map(|(order, name)| Item { name, order })
            .collect()
    }

    fn names(items: &[Item]) -> String {
        items.iter().map(|item| item.name).collect()
    }

    #[test]
    fn test_renumber_assigns_index() {
        let mut list = items("abc");
        list[0].order = 7;
        list[2].order = 7;

        renumber(&mut list);

        assert!(is_renumbered(&list));
        assert_eq!(list.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_sort_by_order_is_stable() {
        let mut list = items("abcd");
        list[0].order = 2;
        list[1].order = 0;
        list[2].order = 2;
        list[3].order = 1;

        sort_by_order(&mut list);

        assert_eq!(names(&list), "bdac");
    }

    #[test]
    fn test_is_dense() {
        let mut list = items("abc");
        assert!(is_dense(&list));

        list.swap(0, 2);
        assert!(is_dense(&list));
        assert!(!is_renumbered(&list));

        list[0].order = 1;
        assert!(!is_dense(&list));

        list[0].order = 3;
        assert!(!is_dense(&list));

        assert!(is_dense::<Item>(&[]));
    }

    #[test]
    fn test_move_within_downward_and_upward() {
        let mut list = items("xyz");
        let index = move_within_or_between(&mut list, 0, Destination::Same, 2);
        assert_eq!(index, Some(2));
        assert_eq!(names(&list), "yzx");
        assert!(is_renumbered(&list));

        let mut list = items("xyz");
        let index = move_within_or_between(&mut list, 2, Destination::Same, 0);
        assert_eq!(index, Some(0));
        assert_eq!(names(&list), "zxy");
    }

    #[test]
    fn test_move_within_clamps_past_end() {
        let mut list = items("xyz");
        let index = move_within_or_between(&mut list, 0, Destination::Same, 3);
        assert_eq!(index, Some(2));
        assert_eq!(names(&list), "yzx");
    }

    #[test]
    fn test_move_between_renumbers_both() {
        let mut source = items("xy");
        let mut dest = items("z");

        let index = move_within_or_between(&mut source, 0, Destination::Other(&mut dest), 1);

        assert_eq!(index, Some(1));
        assert_eq!(names(&source), "y");
        assert_eq!(names(&dest), "zx");
        assert!(is_renumbered(&source));
        assert!(is_renumbered(&dest));
    }

    #[test]
    fn test_move_into_empty_list() {
        let mut source = items("ab");
        let mut dest = Vec::new();

        let index = move_within_or_between(&mut source, 1, Destination::Other(&mut dest), 5);

        assert_eq!(index, Some(0));
        assert_eq!(names(&dest), "b");
        assert_eq!(dest[0].order, 0);
    }

    #[test]
    fn test_move_out_of_bounds_is_noop() {
        let mut list = items("ab");
        assert_eq!(move_within_or_between(&mut list, 2, Destination::Same, 0), None);
        assert_eq!(names(&list), "ab");
    }

    proptest! {
        #[test]
        fn prop_renumber_is_idempotent(orders in prop::collection::vec(0usize..20, 0..12)) {
            let mut list: Vec<Item> = orders
                .iter()
                .map(|&order| Item { name: 'a', order })
                .collect();

            renumber(&mut list);
            let once = list.clone();
            renumber(&mut list);

            prop_assert_eq!(once, list);
        }

        #[test]
        fn prop_moves_keep_lists_dense(
            len_a in 1usize..8,
            len_b in 0usize..8,
            moves in prop::collection::vec((any::<bool>(), 0usize..10, any::<bool>(), 0usize..10), 1..20),
        ) {
            let mut a: Vec<Item> = (0..len_a).map(|order| Item { name: 'a', order }).collect();
            let mut b: Vec<Item> = (0..len_b).map(|order| Item { name: 'b', order }).collect();
            let total = len_a + len_b;

            for (from_a, from, to_a, to) in moves {
                let (source, other) = if from_a { (&mut a, &mut b) } else { (&mut b, &mut a) };
                if source.is_empty() {
                    continue;
                }
                let from = from % source.len();
                let destination = if from_a == to_a {
                    Destination::Same
                } else {
                    Destination::Other(other)
                };
                prop_assert!(move_within_or_between(source, from, destination, to).is_some());
            }

            prop_assert!(is_renumbered(&a));
            prop_assert!(is_renumbered(&b));
            prop_assert_eq!(a.len() + b.len(), total);
        }
    }
}
