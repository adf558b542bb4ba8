//! Most-frequent-value search built on [`ChainedTable`].

use crate::ChainedTable;

/// Every distinct item that occurs most often, plus that occurrence count.
///
/// Modes come back in table iteration order. Empty input yields `([], 0)`.
///
/// ```rust
/// use prime_tables::find_mode;
///
/// let (modes, freq) = find_mode(&["apple", "apple", "grape", "melon", "peach"]);
/// assert_eq!(modes, ["apple"]);
/// assert_eq!(freq, 2);
/// ```
pub fn find_mode<S: AsRef<str>>(items: &[S]) -> (Vec<String>, usize) {
    let mut counts: ChainedTable<usize> = ChainedTable::default();
    let mut highest = 0;
    for item in items {
        let key = item.as_ref();
        let n = match counts.get_mut(key) {
            Some(n) => {
                *n += 1;
                *n
            }
            None => {
                counts.put(key, 1);
                1
            }
        };
        highest = highest.max(n);
    }

    let modes = counts
        .iter()
        .filter(|&(_, &n)| n == highest)
        .map(|(k, _)| k.to_owned())
        .collect();
    (modes, highest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        let none: [&str; 0] = [];
        assert_eq!(find_mode(&none), (Vec::new(), 0));
    }

    #[test]
    fn all_distinct_items_are_modes() {
        let (mut modes, freq) = find_mode(&["x", "y", "z"]);
        modes.sort();
        assert_eq!(modes, ["x", "y", "z"]);
        assert_eq!(freq, 1);
    }

    #[test]
    fn accepts_owned_strings() {
        let items: Vec<String> = ["b", "a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(find_mode(&items), (vec!["b".to_string()], 2));
    }
}
