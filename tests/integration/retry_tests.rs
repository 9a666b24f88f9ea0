use rust_decimal::Decimal;

use super::*;
use price_drop_watcher::CheckOutcome;

#[tokio::test]
async fn test_always_failing_fetch_makes_three_attempts() {
    let harness = Harness::new(vec![]);
    let manager = harness.manager(2);

    let outcome = manager
        .check_with_retry(&test_product("Kindle", Decimal::new(500, 0)))
        .await;

    assert_eq!(outcome, CheckOutcome::Exhausted { attempts: 3, archived: false });
    assert_eq!(harness.fetcher.request_count(), 3);
    assert_eq!(harness.sleeper.total(), 2);
    // No attempt produced a body, so nothing to archive
    assert!(harness.archive.bodies.lock().unwrap().is_empty());
    assert_eq!(harness.notifier.sent(), 0);
}

#[tokio::test]
async fn test_pages_without_price_archive_last_body_once() {
    let harness = Harness::new(vec![
        Step::Page("<html><body>first</body></html>"),
        Step::Fail,
        Step::Page(CAPTCHA_PAGE),
    ]);
    let manager = harness.manager(2);

    let outcome = manager
        .check_with_retry(&test_product("Kindle", Decimal::new(500, 0)))
        .await;

    assert_eq!(outcome, CheckOutcome::Exhausted { attempts: 3, archived: true });
    assert_eq!(harness.fetcher.request_count(), 3);
    assert_eq!(*harness.archive.bodies.lock().unwrap(), vec![CAPTCHA_PAGE.to_string()]);
}

#[tokio::test]
async fn test_recovers_after_two_failures() {
    let harness = Harness::new(vec![Step::Fail, Step::Fail, Step::Page(SPLIT_PRICE_PAGE)]);
    let manager = harness.manager(2);

    let outcome = manager
        .check_with_retry(&test_product("Monitor", Decimal::new(1500, 0)))
        .await;

    assert_eq!(
        outcome,
        CheckOutcome::Resolved {
            price: Decimal::new(149999, 2),
            attempts: 3,
            notified: true,
        }
    );
    assert_eq!(harness.fetcher.request_count(), 3);
    assert_eq!(harness.notifier.sent(), 1);
    assert!(harness.archive.bodies.lock().unwrap().is_empty());

    let message = harness.notifier.messages.lock().unwrap()[0].clone();
    assert!(message.contains("Monitor"));
    assert!(message.contains("R$ 1499.99"));
    assert!(message.contains("R$ 1500.00"));
    assert!(message.contains("https://www.amazon.com.br/dp/monitor"));
}

#[tokio::test]
async fn test_found_price_stops_retrying_even_above_target() {
    let harness = Harness::new(vec![Step::Page(FULL_PRICE_PAGE), Step::Page(FULL_PRICE_PAGE)]);
    let manager = harness.manager(2);

    let outcome = manager
        .check_with_retry(&test_product("Console", Decimal::new(1000, 0)))
        .await;

    assert_eq!(outcome.attempts(), 1);
    assert!(matches!(outcome, CheckOutcome::Resolved { notified: false, .. }));
    assert_eq!(harness.fetcher.request_count(), 1);
    assert_eq!(harness.sleeper.total(), 0);
    assert_eq!(harness.notifier.sent(), 0);
}

#[tokio::test]
async fn test_price_equal_to_target_notifies() {
    let harness = Harness::new(vec![Step::Page(FULL_PRICE_PAGE)]);
    let manager = harness.manager(2);

    manager
        .check_with_retry(&test_product("Console", Decimal::new(1299, 0)))
        .await;

    assert_eq!(harness.notifier.sent(), 1);
}

#[tokio::test]
async fn test_price_one_unit_above_target_does_not_notify() {
    let harness = Harness::new(vec![Step::Page(FULL_PRICE_PAGE)]);
    let manager = harness.manager(2);

    manager
        .check_with_retry(&test_product("Console", Decimal::new(1298, 0)))
        .await;

    assert_eq!(harness.notifier.sent(), 0);
}

#[tokio::test]
async fn test_failed_delivery_is_contained() {
    let harness = Harness::with_notifier(
        vec![Step::Page(FULL_PRICE_PAGE), Step::Page(FULL_PRICE_PAGE)],
        RecordingNotifier::failing(),
    );
    let manager = harness.manager(2);

    let outcome = manager
        .check_with_retry(&test_product("Console", Decimal::new(2000, 0)))
        .await;

    assert_eq!(
        outcome,
        CheckOutcome::Resolved {
            price: Decimal::new(1299, 0),
            attempts: 1,
            notified: false,
        }
    );
    // One delivery attempt, no second fetch
    assert_eq!(harness.notifier.sent(), 1);
    assert_eq!(harness.fetcher.request_count(), 1);
    assert!(harness.archive.bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_retry_waits_respect_jitter_bounds() {
    let harness = Harness::new(vec![]);
    let manager = harness.manager(4);

    manager
        .check_with_retry(&test_product("Kindle", Decimal::new(500, 0)))
        .await;

    let sleeps = harness.sleeper.sleeps.lock().unwrap().clone();
    assert_eq!(sleeps.len(), 4);
    for delay in sleeps {
        assert!(delay >= Duration::from_secs(28) && delay <= Duration::from_secs(35));
    }
}
