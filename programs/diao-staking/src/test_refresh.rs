//! The periodic balance refresh and ordering of its results.

#![cfg(test)]

use crate::gateway::ProviderEvent;
use crate::test_helpers::*;

#[tokio::test(start_paused = true)]
async fn test_tick_picks_up_external_changes() {
    let mock = MockGateway::with(|s| {
        s.token_balances.insert(user(), ONE_TOKEN);
    });
    let session = connected_session(&mock).await;

    // Tokens arrive from elsewhere
    mock.update(|s| {
        s.token_balances.insert(user(), 9 * ONE_TOKEN);
    });
    advance_secs(9).await;
    assert_eq!(session.view().balances.token_balance, ONE_TOKEN);

    advance_secs(1).await;
    assert_eq!(session.view().balances.token_balance, 9 * ONE_TOKEN);
}

#[tokio::test(start_paused = true)]
async fn test_tick_issues_three_reads() {
    let mock = MockGateway::new();
    let session = connected_session(&mock).await;
    let calls = mock.call_count();

    advance_secs(20).await;
    assert_eq!(mock.call_count(), calls + 6);
    assert!(session.refresh_loop_active());
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_keeps_previous_values() {
    let mock = MockGateway::with(|s| {
        s.token_balances.insert(user(), 4 * ONE_TOKEN);
        s.staked.insert(user(), 2 * ONE_TOKEN);
        s.stake_timestamps.insert(user(), T0);
    });
    let session = connected_session(&mock).await;
    let before = session.view().balances;

    // balanceOf would now succeed with a new value, but the batch fails
    mock.update(|s| {
        s.token_balances.insert(user(), 100 * ONE_TOKEN);
        s.fail_timestamp_reads = true;
    });
    assert!(session.refresh().await.is_err());
    advance_secs(10).await;

    assert_eq!(session.view().balances, before);
    // The loop keeps going after a failed tick
    assert!(session.refresh_loop_active());

    mock.update(|s| s.fail_timestamp_reads = false);
    advance_secs(10).await;
    assert_eq!(session.view().balances.token_balance, 100 * ONE_TOKEN);
}

#[tokio::test(start_paused = true)]
async fn test_manual_refresh_applies() {
    let mock = MockGateway::new();
    let session = connected_session(&mock).await;
    mock.update(|s| {
        s.token_balances.insert(user(), 2 * ONE_TOKEN);
    });

    assert!(session.refresh().await.unwrap());
    assert_eq!(session.view().balances.token_balance, 2 * ONE_TOKEN);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_requires_connection() {
    let mock = MockGateway::new();
    let session = new_session(&mock);
    assert!(session.refresh().await.is_err());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_for_previous_account_is_dropped() {
    let mock = MockGateway::with(|s| {
        s.token_balances.insert(user(), 3 * ONE_TOKEN);
    });
    let session = connected_session(&mock).await;

    let gate = std::sync::Arc::new(tokio::sync::Semaphore::new(0));
    mock.update(|s| s.read_gate = Some(gate.clone()));
    let stale = session.clone();
    let stale_refresh = tokio::spawn(async move { stale.refresh().await });
    settle().await;

    mock.update(|s| {
        s.read_gate = None;
        s.token_balances.insert(other_user(), 8 * ONE_TOKEN);
    });
    session
        .handle_provider_event(ProviderEvent::AccountsChanged(vec![other_user()]))
        .await
        .unwrap();

    gate.add_permits(3);
    assert!(!stale_refresh.await.unwrap().unwrap());

    let view = session.view();
    assert_eq!(view.session.account, Some(other_user()));
    assert_eq!(view.balances.token_balance, 8 * ONE_TOKEN);
}

#[tokio::test(start_paused = true)]
async fn test_late_confirmation_for_previous_account_is_ignored() {
    let mock = MockGateway::with(|s| {
        s.token_balances.insert(user(), 3 * ONE_TOKEN);
        s.token_balances.insert(other_user(), 7 * ONE_TOKEN);
    });
    let session = connected_session(&mock).await;
    session
        .handle_provider_event(ProviderEvent::AccountsChanged(vec![other_user()]))
        .await
        .unwrap();

    // A read for the new account is in flight when the old account's
    // transaction confirms
    let gate = std::sync::Arc::new(tokio::sync::Semaphore::new(0));
    mock.update(|s| s.read_gate = Some(gate.clone()));
    let current = session.clone();
    let current_refresh = tokio::spawn(async move { current.refresh().await });
    settle().await;

    let epoch = session.view().balance_epoch();
    assert!(!session.refresh_after_confirmation(user()).await.unwrap());
    assert_eq!(session.view().balance_epoch(), epoch);

    gate.add_permits(3);
    assert!(current_refresh.await.unwrap().unwrap());
    assert_eq!(session.view().balances.token_balance, 7 * ONE_TOKEN);
}
