use super::*;

#[test]
fn subscribe_and_release_accounting() {
    let mut s = ViewportSignals::new();
    let a = s.subscribe(2);
    let b = s.subscribe(5);
    assert_ne!(a, b);
    assert_eq!(s.active_count(), 2);
    assert_eq!(s.subscribers().collect::<Vec<_>>(), vec![2, 5]);

    assert!(s.unsubscribe(a));
    assert!(!s.unsubscribe(a));
    assert!(!s.is_subscribed(a));
    assert!(s.is_subscribed(b));
    assert_eq!(s.active_count(), 1);
    assert_eq!(s.attached_total(), 2);
}

#[test]
fn ids_are_not_reused() {
    let mut s = ViewportSignals::new();
    let a = s.subscribe(0);
    s.unsubscribe(a);
    let b = s.subscribe(0);
    assert_ne!(a, b);
    assert!(!s.unsubscribe(SubscriptionId(999)));
}
