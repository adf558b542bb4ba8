// find_mode tests.
//
// find_mode counts occurrences in a ChainedTable and reports every item
// tied for the highest count together with that count. Mode order follows
// table iteration, so comparisons go through a sorted copy.
use prime_tables::find_mode;

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

// Test: single mode.
#[test]
fn single_mode() {
    let (modes, freq) = find_mode(&["apple", "apple", "grape", "melon", "peach"]);
    assert_eq!(modes, ["apple"]);
    assert_eq!(freq, 2);
}

// Test: three-way tie.
// Verifies: "2", "3" and "4" each appear three times and all are reported.
#[test]
fn three_way_tie() {
    let items = [
        "2", "4", "2", "6", "8", "4", "1", "3", "4", "5", "7", "3", "3", "2",
    ];
    let (modes, freq) = find_mode(&items);
    assert_eq!(sorted(modes), ["2", "3", "4"]);
    assert_eq!(freq, 3);
}

// Test: enough distinct items to force the counting table to grow.
// Verifies: counts survive the internal resizes.
#[test]
fn counts_survive_growth() {
    let mut items: Vec<String> = (0..100).map(|i| format!("item{i}")).collect();
    items.extend((0..5).map(|_| "hot".to_string()));
    items.extend((0..5).map(|_| "cold".to_string()));
    let (modes, freq) = find_mode(&items);
    assert_eq!(sorted(modes), ["cold", "hot"]);
    assert_eq!(freq, 5);
}

// Test: no input.
#[test]
fn empty_input() {
    let items: Vec<String> = Vec::new();
    let (modes, freq) = find_mode(&items);
    assert!(modes.is_empty());
    assert_eq!(freq, 0);
}
