//! Lock window derivation through a connected session.

#![cfg(test)]

use crate::error::SessionError;
use crate::test_helpers::*;

fn staked_at(timestamp: u64) -> std::sync::Arc<MockGateway> {
    MockGateway::with(|s| {
        s.token_balances.insert(user(), 10 * ONE_TOKEN);
        s.staked.insert(user(), 5 * ONE_TOKEN);
        s.stake_timestamps.insert(user(), timestamp);
    })
}

#[tokio::test(start_paused = true)]
async fn test_ten_days_into_lock() {
    let mock = staked_at(T0 - 10 * DAY);
    let session = connected_session(&mock).await;
    let view = session.view();

    assert_eq!(view.time_left, Some(20 * DAY));
    assert!(view.show_staked_panel());
    assert_eq!(
        view.lock_message().unwrap(),
        "언스테이킹까지 남은 시간: 20일 0시간 0분"
    );
    assert_eq!(
        view.staked_label(session.config()).unwrap(),
        "스테이킹된 금액: 5.000000 DIAO"
    );
    assert!(!view.can_unstake());
    assert!(session.countdown_active());

    // The precondition holds even if a caller ignores can_unstake
    let err = session.unstake().await.unwrap_err();
    assert_eq!(err, SessionError::StakeLocked { remaining: 20 * DAY });
    assert!(mock.sent_selectors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_forty_days_after_stake() {
    let mock = staked_at(T0 - 40 * DAY);
    let session = connected_session(&mock).await;
    let view = session.view();

    assert_eq!(view.time_left, Some(0));
    assert!(view.can_unstake());
    assert_eq!(
        view.lock_message().unwrap(),
        "스테이킹 기간이 완료되었습니다! 이제 출금하실 수 있습니다."
    );
    assert!(!session.countdown_active());
}

#[tokio::test(start_paused = true)]
async fn test_countdown_ticks_down_and_stops_at_zero() {
    let mock = staked_at(T0 - LOCK + 3);
    let session = connected_session(&mock).await;
    settle().await;

    assert_eq!(session.view().time_left, Some(3));
    assert!(!session.view().can_unstake());
    assert!(session.countdown_active());

    advance_secs(1).await;
    assert_eq!(session.view().time_left, Some(2));
    assert!(session.countdown_active());

    advance_secs(1).await;
    assert_eq!(session.view().time_left, Some(1));
    assert!(!session.view().can_unstake());

    advance_secs(1).await;
    assert_eq!(session.view().time_left, Some(0));
    assert!(!session.countdown_active());
    assert!(session.view().can_unstake());

    // Nothing left to tick
    advance_secs(2).await;
    assert_eq!(session.view().time_left, Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_stale_timestamp_without_stake_is_ignored() {
    // Contract kept the old timestamp after a full withdraw
    let mock = MockGateway::with(|s| {
        s.token_balances.insert(user(), ONE_TOKEN);
        s.stake_timestamps.insert(user(), T0 - DAY);
    });
    let session = connected_session(&mock).await;
    let view = session.view();

    assert_eq!(view.balances.stake_timestamp, None);
    assert_eq!(view.time_left, None);
    assert!(!view.lock_active());
    assert!(!view.can_unstake());
    assert!(!session.countdown_active());
}
