use super::*;

use crate::board::Layered;
use crate::container::Representation;
use crate::trie::Trie;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{HashMap, HashSet};

/// Narrow boards keep bitmap containers small (9-bit layers, 512 slots).
type Board = FixedBoard<3, 4>;

/// Walks the whole trie and checks its structural invariants.
fn validate_trie<B: Layered, V, const BITS: u32>(t: &Trie<B, V, BITS>) {
    let last = B::DEPTH - 1;
    let mut stack = Vec::new();
    if let Some(root) = t.root() {
        stack.push((root, 0usize));
    }

    let mut reachable = 0usize;
    let mut leaf_entries = 0usize;
    while let Some((id, depth)) = stack.pop() {
        reachable += 1;
        let node = t.container(id);
        assert_eq!(
            node.is_leaf(),
            depth == last,
            "{} container at depth {depth} of {}",
            node.kind(),
            B::DEPTH
        );

        let keys = node.keys();
        assert_eq!(keys.len(), node.len());
        let sorted = node.sorted_len();
        assert!(sorted <= keys.len());
        assert!(
            keys[..sorted].windows(2).all(|w| w[0] < w[1]),
            "sorted prefix must be strictly ascending"
        );
        let distinct: HashSet<u16> = keys.iter().copied().collect();
        assert_eq!(distinct.len(), keys.len(), "keys must be unique per container");

        if node.is_leaf() {
            leaf_entries += node.len();
        } else {
            for (_, &child) in node.children() {
                stack.push((child, depth + 1));
            }
        }
    }

    assert_eq!(reachable, t.node_count(), "every arena node must be reachable");
    assert_eq!(leaf_entries, t.len(), "leaf entries must match len()");
}

fn board_strategy() -> impl Strategy<Value = Board> + Clone {
    // Two values per cell makes repeated boards common.
    prop::array::uniform12(0u8..2).prop_map(|cells| {
        let mut b = Board::new();
        for (i, c) in cells.into_iter().enumerate() {
            b.set_index(i, c);
        }
        b
    })
}

fn config_strategy() -> impl Strategy<Value = TrieConfig> {
    let rep = prop_oneof![Just(Representation::Array), Just(Representation::Bitmap)];
    (
        1usize..6,
        prop_oneof![Just(2usize), Just(8), Just(64)],
        prop::collection::vec(rep.clone(), 0..5),
        rep,
    )
        .prop_map(|(initial_capacity, resort_threshold, depths, fallback)| TrieConfig {
            initial_capacity,
            resort_threshold,
            layout: Layout::new(depths).with_fallback(fallback),
        })
}

#[derive(Debug, Clone, Arbitrary)]
enum SetOp {
    #[proptest(weight = 8)]
    Append(#[proptest(strategy = "board_strategy()")] Board),
    #[proptest(weight = 6)]
    TryAppend(#[proptest(strategy = "board_strategy()")] Board),
    #[proptest(weight = 6)]
    Contains(#[proptest(strategy = "board_strategy()")] Board),
    #[proptest(weight = 4)]
    ProbeAppend(#[proptest(strategy = "board_strategy()")] Board),
    Shutdown,
}

#[derive(Debug, Clone)]
enum MapOp {
    Insert(Board, u16),
    Update(Board, u16),
    Get(Board),
    ProbeInsert(Board, u16),
    Shutdown,
}

fn map_ops_strategy() -> impl Strategy<Value = Vec<MapOp>> {
    let board = board_strategy();
    let op = prop_oneof![
        40 => (board.clone(), any::<u16>()).prop_map(|(b, v)| MapOp::Insert(b, v)),
        25 => (board.clone(), any::<u16>()).prop_map(|(b, v)| MapOp::Update(b, v)),
        25 => board.clone().prop_map(MapOp::Get),
        9 => (board, any::<u16>()).prop_map(|(b, v)| MapOp::ProbeInsert(b, v)),
        1 => Just(MapOp::Shutdown),
    ];
    prop::collection::vec(op, 0..400)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_set_equivalence(
        config in config_strategy(),
        ops in prop::collection::vec(any::<SetOp>(), 0..400),
    ) {
        let mut s: BoardSet<Board> = BoardSet::with_config(config).unwrap();
        let mut m: HashSet<Board> = HashSet::new();

        for op in ops {
            match op {
                SetOp::Append(b) => {
                    s.append(&b).unwrap();
                    m.insert(b);
                }
                SetOp::TryAppend(b) => {
                    prop_assert_eq!(s.try_append(&b).unwrap(), m.insert(b));
                }
                SetOp::Contains(b) => {
                    prop_assert_eq!(s.contains(&b), m.contains(&b));
                }
                SetOp::ProbeAppend(b) => match s.probe(&b) {
                    Probe::Present(_) => {
                        prop_assert!(m.contains(&b));
                    }
                    Probe::Absent(miss) => {
                        prop_assert!(!m.contains(&b));
                        s.append_new(&b, miss).unwrap();
                        m.insert(b);
                    }
                },
                SetOp::Shutdown => {
                    s.shutdown();
                    m.clear();
                }
            }
            prop_assert_eq!(s.len(), m.len());
        }

        validate_trie(&s.trie);
        let got: HashSet<Board> = s.iter().collect();
        prop_assert_eq!(got, m);
    }

    #[test]
    fn prop_map_equivalence(
        config in config_strategy(),
        ops in map_ops_strategy(),
    ) {
        let mut t: BoardMap<Board, u16> = BoardMap::with_config(config).unwrap();
        let mut m: HashMap<Board, u16> = HashMap::new();

        for op in ops {
            match op {
                MapOp::Insert(b, v) => {
                    let (got, inserted) = t.insert(&b, v).unwrap();
                    let got = *got;
                    let expected_new = !m.contains_key(&b);
                    let expected = *m.entry(b).or_insert(v);
                    prop_assert_eq!((got, inserted), (expected, expected_new));
                }
                MapOp::Update(b, v) => {
                    let (got, inserted) = t.insert_or_update(&b, v).unwrap();
                    prop_assert_eq!(*got, v);
                    prop_assert_eq!(inserted, m.insert(b, v).is_none());
                }
                MapOp::Get(b) => {
                    prop_assert_eq!(t.get(&b), m.get(&b));
                }
                MapOp::ProbeInsert(b, v) => match t.probe(&b) {
                    Probe::Present(&got) => {
                        prop_assert_eq!(Some(&got), m.get(&b));
                    }
                    Probe::Absent(miss) => {
                        prop_assert!(!m.contains_key(&b));
                        prop_assert_eq!(*t.insert_new(&b, miss, v).unwrap(), v);
                        m.insert(b, v);
                    }
                },
                MapOp::Shutdown => {
                    t.shutdown();
                    m.clear();
                }
            }
            prop_assert_eq!(t.len(), m.len());
        }

        validate_trie(&t.trie);
        let got: HashMap<Board, u16> = t.iter().map(|(b, v)| (b, *v)).collect();
        prop_assert_eq!(got, m);
    }

    #[test]
    fn prop_find_matches_linear_scan(
        keys in prop::collection::hash_set(any::<u16>(), 0..400),
        split in 0.0f64..=1.0,
        probes in prop::collection::vec(any::<u16>(), 0..32),
    ) {
        let mut keys: Vec<u16> = keys.into_iter().collect();
        let sorted = (keys.len() as f64 * split) as usize;
        keys[..sorted].sort_unstable();

        for probe in probes.into_iter().chain(keys.iter().copied()) {
            prop_assert_eq!(scan::find(&keys, sorted, probe), scan::linear_find(&keys, probe));
            prop_assert_eq!(scan::scan_lanes(&keys, probe), scan::linear_find(&keys, probe));
        }
    }

    #[test]
    fn prop_quicksort_sorts_unique_keys(keys in prop::collection::hash_set(any::<u16>(), 0..600)) {
        let mut keys: Vec<u16> = keys.into_iter().collect();
        let mut values: Vec<u32> = keys.iter().map(|&k| u32::from(k) ^ 0xdead).collect();
        let mut expected = keys.clone();
        expected.sort_unstable();

        scan::quicksort(&mut keys, &mut values);
        prop_assert_eq!(&keys, &expected);
        for (k, v) in keys.iter().zip(&values) {
            prop_assert_eq!(u32::from(*k) ^ 0xdead, *v);
        }
    }
}

#[test]
fn five_by_five_scenario() {
    let mut s: BoardSet<FixedBoard<5, 5>> = BoardSet::new();
    let board = crate::testutil::sample_5x5();
    s.append(&board).unwrap();
    s.append(&board).unwrap();
    assert_eq!(s.len(), 1);
    assert!(s.contains(&board));

    let mut other = board;
    other.set(3, 3, 0);
    assert!(!s.contains(&other));
    validate_trie(&s.trie);
}

#[test]
fn bulk_random_boards_hit_resort_path() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(2024);
    let mut s: BoardSet<FixedBoard<5, 5>> = BoardSet::new();
    let mut m: HashSet<FixedBoard<5, 5>> = HashSet::new();
    for _ in 0..20_000 {
        let mut b = FixedBoard::new();
        for i in 0..25 {
            b.set_index(i, rng.gen_range(0..=MAX_CELL));
        }
        // Keep the first two visited rows (0 and 4) low-entropy so that upper
        // levels fan out past the resort threshold.
        for x in 0..5 {
            b.set(x, 0, b.get(x, 0) % 3);
            b.set(x, 4, b.get(x, 4) % 2);
        }
        assert_eq!(s.try_append(&b).unwrap(), m.insert(b));
    }
    assert_eq!(s.len(), m.len());
    for b in &m {
        assert!(s.contains(b));
    }

    let stats = s.stats();
    assert!(stats.sorted_entries > 0, "expected at least one resorted container");
    validate_trie(&s.trie);
}
