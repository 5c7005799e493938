//! Integration tests for the B-tree engine.
//!
//! These walk whole insert/delete sequences through the public API and check
//! the resulting shape, not just the contents.

use medindex::{BTree, Error, TreeConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn order4() -> BTree<i32, String> {
    BTree::new(TreeConfig::default()).unwrap()
}

fn keys<V>(tree: &BTree<i32, V>) -> Vec<i32> {
    tree.traverse().map(|(k, _)| *k).collect()
}

fn scenario_a() -> BTree<i32, String> {
    let mut tree = order4();
    for key in [10, 20, 5, 6, 12, 30, 7, 17] {
        tree.insert(key, format!("med-{key}")).unwrap();
    }
    tree
}

/// Root splits on the fourth insert; by the fifth it has one key over two leaves.
#[test]
fn test_scenario_a_root_split() {
    let mut tree = order4();
    for key in [10, 20, 5, 6, 12] {
        tree.insert(key, String::new()).unwrap();
    }

    let root = tree.node(tree.root_id());
    assert_eq!(root.keys(), &[10]);
    assert_eq!(root.children().len(), 2);
    assert_eq!(tree.node(root.children()[0]).keys(), &[5, 6]);
    assert_eq!(tree.node(root.children()[1]).keys(), &[12, 20]);
    assert_eq!(tree.stats().snapshot().root_splits, 1);

    let tree = scenario_a();
    assert_eq!(keys(&tree), vec![5, 6, 7, 10, 12, 17, 20, 30]);
    assert_eq!(tree.height(), 2);
    assert_eq!(tree.node(tree.root_id()).keys(), &[10, 20]);
    tree.check_invariants().unwrap();
}

#[test]
fn test_scenario_b_delete_from_leaf() {
    let mut tree = scenario_a();
    assert_eq!(tree.delete(&6), Ok("med-6".to_string()));
    assert_eq!(keys(&tree), vec![5, 7, 10, 12, 17, 20, 30]);
    tree.check_invariants().unwrap();
}

/// Deleting from a minimal leaf pulls a key through the parent from its
/// left sibling.
#[test]
fn test_delete_from_minimal_leaf_borrows() {
    let mut tree = scenario_a();
    tree.stats().reset();

    tree.delete(&30).unwrap();

    let root = tree.node(tree.root_id());
    assert_eq!(root.keys(), &[10, 17]);
    assert_eq!(tree.node(root.children()[2]).keys(), &[20]);
    assert_eq!(keys(&tree), vec![5, 6, 7, 10, 12, 17, 20]);

    let stats = tree.stats().snapshot();
    assert_eq!(stats.borrows, 1);
    assert_eq!(stats.merges, 0);
    tree.check_invariants().unwrap();
}

#[test]
fn test_scenario_c_missing_search_does_not_mutate() {
    let tree = scenario_a();
    let before = tree.stats().snapshot();

    assert_eq!(tree.search(&99), Err(Error::NotFound));

    let after = tree.stats().snapshot();
    assert_eq!(after.searches, before.searches + 1);
    assert_eq!(after.splits, before.splits);
    assert_eq!(keys(&tree), vec![5, 6, 7, 10, 12, 17, 20, 30]);
    assert_eq!(tree.node_count(), 4);
}

#[test]
fn test_delete_missing_does_not_restructure() {
    let mut tree = scenario_a();
    let nodes = tree.node_count();

    assert_eq!(tree.delete(&99), Err(Error::NotFound));

    assert_eq!(tree.node_count(), nodes);
    assert_eq!(tree.len(), 8);
    assert_eq!(tree.stats().snapshot().merges, 0);
    tree.check_invariants().unwrap();
}

#[test]
fn test_scenario_d_random_permutation_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut order: Vec<i32> = (1..100).collect();
    order.shuffle(&mut rng);

    let mut tree = BTree::with_order(4).unwrap();
    for &key in &order {
        tree.insert(key, key * 2).unwrap();
        tree.check_invariants().unwrap();
    }
    assert_eq!(keys(&tree), (1..100).collect::<Vec<_>>());

    order.shuffle(&mut rng);
    for &key in &order {
        assert_eq!(tree.delete(&key), Ok(key * 2));
        tree.check_invariants().unwrap();
    }

    assert!(tree.traverse().next().is_none());
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.node_count(), 1);
    assert!(tree.node(tree.root_id()).is_leaf());

    let stats = tree.stats().snapshot();
    assert_eq!(stats.height_delta(), 0);
    assert!(stats.merges > 0);
}

#[test]
fn test_string_keys_are_owned() {
    let mut tree = BTree::new(TreeConfig::default()).unwrap();
    let mut names = vec!["ibuprofen", "aspirin", "codeine", "morphine", "zinc"];
    for name in &names {
        let key = name.to_string();
        tree.insert(key, name.len()).unwrap();
    }

    names.sort_unstable();
    let walked: Vec<&str> = tree.traverse().map(|(k, _)| k.as_str()).collect();
    assert_eq!(walked, names);

    assert_eq!(tree.remove_entry("codeine"), Ok(("codeine".to_string(), 7)));
    assert_eq!(tree.search("codeine"), Err(Error::NotFound));
}

#[test]
fn test_larger_orders() {
    for order in [6, 8, 32] {
        let mut tree = BTree::with_order(order).unwrap();
        for key in 0..500 {
            tree.insert(key, ()).unwrap();
        }
        tree.check_invariants().unwrap();
        for key in (0..500).step_by(3) {
            tree.delete(&key).unwrap();
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), 500 - 167);
    }
}

#[test]
fn test_invalid_orders() {
    for order in [0, 1, 2, 3, 5] {
        assert!(matches!(
            BTree::<i32, ()>::with_order(order),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
