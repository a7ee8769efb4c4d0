mod common;

use common::{approx_eq, friend, negative, positive, shared};
use lifefold::{Polarity, compute_direct_balance, compute_network_effect, compute_timeline};

#[test]
fn test_direct_balance_sums_signed_magnitudes() {
    let events = vec![negative("a", 5), positive("b", 12), negative("c", 20)];
    assert_eq!(compute_direct_balance(&events), -13);
}

#[test]
fn test_direct_balance_ignores_friends() {
    let events = vec![shared(positive("a", 10), &["f"])];
    assert_eq!(compute_direct_balance(&events), 10);
}

#[test]
fn test_direct_balance_order_independent() {
    let mut events = vec![negative("a", 5), positive("b", 12), negative("c", 20)];
    let forward = compute_direct_balance(&events);
    events.reverse();
    assert_eq!(compute_direct_balance(&events), forward);
}

#[test]
fn test_timeline_starts_at_origin() {
    let timeline = compute_timeline(&[], &[]);
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].index, 0);
    assert_eq!(timeline[0].direct, 0);
    assert_eq!(timeline[0].network, 0.0);
    assert_eq!(timeline[0].polarity, None);
}

#[test]
fn test_timeline_accumulates() {
    let friends = vec![friend("f", 0.5)];
    let events = vec![
        negative("a", 4),
        shared(positive("b", 10), &["f"]),
        shared(negative("c", 2), &["f"]),
    ];

    let timeline = compute_timeline(&events, &friends);

    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline[1].direct, -4);
    assert_eq!(timeline[1].network, -4.0);
    assert_eq!(timeline[1].polarity, Some(Polarity::Negative));
    assert_eq!(timeline[2].direct, 6);
    assert_eq!(timeline[2].network, 11.0);
    assert_eq!(timeline[3].direct, 4);
    assert_eq!(timeline[3].network, 9.0);
    assert_eq!(timeline[3].index, 3);
}

#[test]
fn test_timeline_end_matches_aggregates() {
    let friends = vec![friend("f", 0.3), friend("g", 0.9)];
    let events = vec![
        shared(positive("a", 7), &["f", "g"]),
        negative("b", 11),
        shared(positive("c", 13), &["g", "removed"]),
    ];

    let last = compute_timeline(&events, &friends).pop().unwrap();
    let direct = compute_direct_balance(&events);
    let network = compute_network_effect(&events, &friends).total;

    assert_eq!(last.direct, direct);
    assert!(approx_eq(last.network, direct as f64 + network));
}
