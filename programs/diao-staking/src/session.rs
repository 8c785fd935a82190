// =============================================================================
// Staking Session
// =============================================================================
// Shared handles for one browser session: the wallet gateway, configuration,
// the render-facing view state, and the two timers (balance refresh and lock
// countdown). Cloning is cheap; spawned timers hold their own clone.
// =============================================================================

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::countdown::{self, Clock, SystemClock};
use crate::error::{Result, SessionError};
use crate::gateway::{Address, WalletGateway};
use crate::reader;
use crate::state::ViewState;

#[derive(Default)]
pub(crate) struct Timers {
    refresh: Option<JoinHandle<()>>,
    /// Countdown task and the stake timestamp it was started for
    countdown: Option<(u64, JoinHandle<()>)>,
}

impl Timers {
    fn stop_all(&mut self) {
        if let Some(handle) = self.refresh.take() {
            handle.abort();
        }
        if let Some((_, handle)) = self.countdown.take() {
            handle.abort();
        }
    }
}

pub struct StakingSession<G: WalletGateway> {
    pub(crate) gateway: Arc<G>,
    pub(crate) config: Arc<SessionConfig>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) view: Arc<RwLock<ViewState>>,
    pub(crate) timers: Arc<Mutex<Timers>>,
    /// Bumped to cancel every in-flight receipt wait
    pub(crate) cancel: Arc<watch::Sender<u64>>,
}

impl<G: WalletGateway> Clone for StakingSession<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: Arc::clone(&self.config),
            clock: Arc::clone(&self.clock),
            view: Arc::clone(&self.view),
            timers: Arc::clone(&self.timers),
            cancel: Arc::clone(&self.cancel),
        }
    }
}

impl<G: WalletGateway> StakingSession<G> {
    pub fn new(gateway: Arc<G>, config: SessionConfig) -> Result<Self> {
        Self::with_clock(gateway, config, Arc::new(SystemClock))
    }

    pub fn with_clock(gateway: Arc<G>, config: SessionConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let (cancel, _) = watch::channel(0u64);
        Ok(Self {
            gateway,
            config: Arc::new(config),
            clock,
            view: Arc::new(RwLock::new(ViewState::default())),
            timers: Arc::new(Mutex::new(Timers::default())),
            cancel: Arc::new(cancel),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of the current view state
    pub fn view(&self) -> ViewState {
        self.view.read().clone()
    }

    pub fn set_stake_input(&self, input: impl Into<String>) {
        self.view.write().stake_input = input.into();
    }

    pub fn set_reward_input(&self, input: impl Into<String>) {
        self.view.write().reward_input = input.into();
    }

    pub(crate) fn connected_account(&self) -> Result<Address> {
        self.view.read().session.account.ok_or(SessionError::NotConnected)
    }

    /// Abandon every in-flight receipt wait. Submitted transactions are not
    /// affected; their actions end with `Cancelled`.
    pub fn cancel_pending(&self) {
        self.cancel.send_modify(|generation| *generation += 1);
    }

    pub(crate) fn cancel_signal(&self) -> watch::Receiver<u64> {
        self.cancel.subscribe()
    }

    // =========================================================================
    // Balance refresh
    // =========================================================================

    /// Re-read balances for the connected account.
    ///
    /// A result is only applied if no account change or confirmed transaction
    /// happened while the reads were in flight.
    pub(crate) async fn refresh_balances(&self) -> Result<bool> {
        let (account, epoch) = {
            let view = self.view.read();
            let account = view.session.account.ok_or(SessionError::NotConnected)?;
            (account, view.balance_epoch())
        };
        self.refresh_at(account, epoch).await
    }

    /// Refresh that supersedes every refresh issued before a confirmation.
    ///
    /// Skipped when `account` is no longer the session account, so a late
    /// confirmation cannot invalidate reads issued for the new account.
    pub(crate) async fn refresh_after_confirmation(&self, account: Address) -> Result<bool> {
        let epoch = {
            let mut view = self.view.write();
            if view.session.account != Some(account) {
                debug!(%account, "Account changed before confirmation, skipping refresh");
                return Ok(false);
            }
            view.advance_epoch()
        };
        self.refresh_at(account, epoch).await
    }

    async fn refresh_at(&self, account: Address, epoch: u64) -> Result<bool> {
        let balances = reader::fetch_balances(&*self.gateway, &self.config, account).await?;
        let applied = self.view.write().apply_balances(
            epoch,
            account,
            balances,
            self.clock.now(),
            self.config.lock_duration_secs,
        );
        if applied {
            self.sync_countdown();
        }
        Ok(applied)
    }

    /// Re-check ownership of the staking contract for `account`
    pub(crate) async fn refresh_owner(&self, account: Address) {
        match reader::fetch_owner(&*self.gateway, &self.config).await {
            Ok(owner) => {
                let is_owner = owner == account;
                debug!(%owner, %account, is_owner, "Owner read");
                self.view.write().set_owner(account, is_owner);
            }
            Err(err) => warn!(error = %err, "Owner read failed"),
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// (Re)start the 10-second refresh loop for the connected account
    pub(crate) fn start_refresh_loop(&self) {
        let session = self.clone();
        let interval = self.config.refresh_interval();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match session.refresh_balances().await {
                    Ok(_) => {}
                    Err(SessionError::NotConnected) => break,
                    // Retried on the next tick; displayed values stay as they are
                    Err(err) => warn!(error = %err, "Periodic balance refresh failed"),
                }
            }
        });

        if let Some(previous) = self.timers.lock().refresh.replace(handle) {
            previous.abort();
        }
    }

    /// Start, keep or stop the countdown to match the current lock window
    pub(crate) fn sync_countdown(&self) {
        let (active, stake_timestamp) = {
            let view = self.view.read();
            (view.lock_active(), view.balances.stake_timestamp)
        };

        let mut timers = self.timers.lock();
        match (active, stake_timestamp) {
            (true, Some(ts)) => {
                if let Some((running_ts, handle)) = &timers.countdown {
                    if *running_ts == ts && !handle.is_finished() {
                        return;
                    }
                }
                let handle = countdown::spawn_countdown(
                    Arc::clone(&self.view),
                    Arc::clone(&self.clock),
                    self.config.lock_duration_secs,
                    self.config.countdown_interval(),
                );
                if let Some((_, previous)) = timers.countdown.replace((ts, handle)) {
                    previous.abort();
                }
            }
            _ => {
                if let Some((_, handle)) = timers.countdown.take() {
                    handle.abort();
                }
            }
        }
    }

    pub fn refresh_loop_active(&self) -> bool {
        self.timers
            .lock()
            .refresh
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn countdown_active(&self) -> bool {
        self.timers
            .lock()
            .countdown
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Stop timers and drop the session; with `cancel_waits`, also abandon
    /// in-flight receipt waits.
    pub(crate) fn teardown(&self, cancel_waits: bool) {
        info!(cancel_waits, "Tearing down staking session");
        self.timers.lock().stop_all();
        if cancel_waits {
            self.cancel_pending();
        }
        self.view.write().clear_session();
    }
}
