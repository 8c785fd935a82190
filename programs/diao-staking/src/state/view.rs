use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::amount::format_units;
use crate::config::SessionConfig;
use crate::countdown::{format_time, remaining_lock};
use crate::error::{Result, SessionError};
use crate::gateway::Address;
use crate::state::{Balances, Session};

/// Independent action triggers. Each slot runs at most one action at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ActionSlot {
    Connect,
    Stake,
    Unstake,
    FundReward,
}

impl ActionSlot {
    /// Name used in status lines
    pub fn label(self) -> &'static str {
        match self {
            ActionSlot::Connect => "지갑 연결",
            ActionSlot::Stake => "스테이킹",
            ActionSlot::Unstake => "언스테이킹",
            ActionSlot::FundReward => "보상 풀 충전",
        }
    }
}

/// Progress of one action slot.
///
/// `Idle → Validating → (Approving → Staking | Funding) | Withdrawing
///  → Refreshing → Success | Error`; connect goes through `Connecting`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ActionPhase {
    #[default]
    Idle,
    Connecting,
    Validating,
    Approving,
    Staking,
    Withdrawing,
    Funding,
    Refreshing,
    Success,
    Error,
}

impl ActionPhase {
    pub fn is_in_flight(self) -> bool {
        !matches!(
            self,
            ActionPhase::Idle | ActionPhase::Success | ActionPhase::Error
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Status {
    pub severity: Severity,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
struct ActionPhases {
    connect: ActionPhase,
    stake: ActionPhase,
    unstake: ActionPhase,
    fund_reward: ActionPhase,
}

impl ActionPhases {
    fn get(&self, slot: ActionSlot) -> ActionPhase {
        match slot {
            ActionSlot::Connect => self.connect,
            ActionSlot::Stake => self.stake,
            ActionSlot::Unstake => self.unstake,
            ActionSlot::FundReward => self.fund_reward,
        }
    }

    fn set(&mut self, slot: ActionSlot, phase: ActionPhase) {
        match slot {
            ActionSlot::Connect => self.connect = phase,
            ActionSlot::Stake => self.stake = phase,
            ActionSlot::Unstake => self.unstake = phase,
            ActionSlot::FundReward => self.fund_reward = phase,
        }
    }
}

/// Everything a renderer needs, updated by the session.
///
/// Balance results are ordered by `balance_epoch`: the epoch advances on
/// account changes and on every confirmed transaction, and a refresh only
/// lands if no advance happened while it was in flight.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ViewState {
    pub session: Session,
    pub balances: Balances,
    /// Seconds until unstake unlocks; `None` without an active stake
    pub time_left: Option<u64>,
    pub status: Option<Status>,
    pub stake_input: String,
    pub reward_input: String,
    actions: ActionPhases,
    #[serde(skip)]
    balance_epoch: u64,
}

impl ViewState {
    // =========================================================================
    // Action slots
    // =========================================================================

    pub fn phase(&self, slot: ActionSlot) -> ActionPhase {
        self.actions.get(slot)
    }

    pub fn is_busy(&self, slot: ActionSlot) -> bool {
        self.phase(slot).is_in_flight()
    }

    pub(crate) fn set_phase(&mut self, slot: ActionSlot, phase: ActionPhase) {
        self.actions.set(slot, phase);
    }

    pub fn set_status(&mut self, severity: Severity, message: impl Into<String>) {
        self.status = Some(Status {
            severity,
            message: message.into(),
        });
    }

    // =========================================================================
    // Session and balances
    // =========================================================================

    pub fn balance_epoch(&self) -> u64 {
        self.balance_epoch
    }

    /// Invalidate every refresh issued so far
    pub(crate) fn advance_epoch(&mut self) -> u64 {
        self.balance_epoch += 1;
        self.balance_epoch
    }

    /// Switch to `account`, discarding the previous account's values.
    ///
    /// Returns false when `account` is already the connected one.
    pub(crate) fn adopt_account(&mut self, account: Address) -> bool {
        if self.session.account == Some(account) {
            return false;
        }
        self.session = Session::connected(account);
        self.balances = Balances::default();
        self.time_left = None;
        self.advance_epoch();
        true
    }

    /// Drop the session and everything read for it. Action phases, inputs and
    /// the status line survive so in-flight actions still report.
    pub(crate) fn clear_session(&mut self) {
        self.session = Session::default();
        self.balances = Balances::default();
        self.time_left = None;
        self.advance_epoch();
    }

    pub(crate) fn set_owner(&mut self, account: Address, is_owner: bool) {
        if self.session.account == Some(account) {
            self.session.is_owner = is_owner;
        }
    }

    /// Store a refresh result issued at `epoch` for `account`.
    ///
    /// Returns false (and changes nothing) when the account is no longer
    /// connected or the epoch advanced since the refresh was issued.
    pub(crate) fn apply_balances(
        &mut self,
        epoch: u64,
        account: Address,
        balances: Balances,
        now: u64,
        lock_duration: u64,
    ) -> bool {
        if self.session.account != Some(account) {
            debug!(%account, "Dropping balances for disconnected account");
            return false;
        }
        if epoch != self.balance_epoch {
            debug!(
                epoch,
                current = self.balance_epoch,
                "Dropping stale balance refresh"
            );
            return false;
        }
        self.balances = balances;
        self.time_left = remaining_lock(&balances, now, lock_duration);
        true
    }

    /// Recompute `time_left`; returns the new value
    pub(crate) fn tick_countdown(&mut self, now: u64, lock_duration: u64) -> Option<u64> {
        self.time_left = remaining_lock(&self.balances, now, lock_duration);
        self.time_left
    }

    /// A nonzero stake whose window has not elapsed yet
    pub fn lock_active(&self) -> bool {
        self.balances.has_stake() && self.time_left.is_some_and(|t| t > 0)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// "연결된 지갑: 0x1234...abcd"
    pub fn account_label(&self) -> Option<String> {
        self.session
            .account
            .map(|account| format!("연결된 지갑: {}", account.short()))
    }

    /// "보유량: 1.000000 DIAO"
    pub fn token_balance_label(&self, config: &SessionConfig) -> String {
        format!(
            "보유량: {} {}",
            format_units(
                self.balances.token_balance,
                config.token_decimals,
                config.display_precision
            ),
            config.token_symbol
        )
    }

    /// The staked-amount panel is hidden while nothing is staked
    pub fn show_staked_panel(&self) -> bool {
        self.is_connected() && self.balances.has_stake()
    }

    /// "스테이킹된 금액: 1.000000 DIAO"
    pub fn staked_label(&self, config: &SessionConfig) -> Option<String> {
        self.show_staked_panel().then(|| {
            format!(
                "스테이킹된 금액: {} {}",
                format_units(
                    self.balances.staked_amount,
                    config.token_decimals,
                    config.display_precision
                ),
                config.token_symbol
            )
        })
    }

    /// Countdown or unlock notice under the staked panel
    pub fn lock_message(&self) -> Option<String> {
        if !self.show_staked_panel() {
            return None;
        }
        self.time_left.map(|left| {
            if left > 0 {
                format!("언스테이킹까지 남은 시간: {}", format_time(left))
            } else {
                "스테이킹 기간이 완료되었습니다! 이제 출금하실 수 있습니다.".to_string()
            }
        })
    }

    pub fn can_connect(&self) -> bool {
        !self.is_connected() && !self.is_busy(ActionSlot::Connect)
    }

    pub fn can_stake(&self) -> bool {
        self.is_connected()
            && !self.is_busy(ActionSlot::Stake)
            && !self.stake_input.trim().is_empty()
    }

    /// Disabled while the lock window is open
    pub fn can_unstake(&self) -> bool {
        self.is_connected()
            && !self.is_busy(ActionSlot::Unstake)
            && self.balances.has_stake()
            && !self.lock_active()
    }

    pub fn can_fund_reward(&self) -> bool {
        self.is_connected()
            && self.session.is_owner
            && !self.is_busy(ActionSlot::FundReward)
            && !self.reward_input.trim().is_empty()
    }
}

/// Marks an action slot busy for the lifetime of the guard.
///
/// Dropping the guard without `finish` (the action future was dropped) puts
/// the slot back to `Idle`.
pub struct SlotGuard {
    view: Arc<RwLock<ViewState>>,
    slot: ActionSlot,
    finished: bool,
}

impl SlotGuard {
    pub fn begin(
        view: Arc<RwLock<ViewState>>,
        slot: ActionSlot,
        phase: ActionPhase,
    ) -> Result<Self> {
        {
            let mut state = view.write();
            if state.is_busy(slot) {
                return Err(SessionError::ActionInProgress(slot));
            }
            state.set_phase(slot, phase);
        }
        Ok(Self {
            view,
            slot,
            finished: false,
        })
    }

    /// Move to the next in-flight phase and show `message`
    pub fn advance(&self, phase: ActionPhase, message: &str) {
        info!(slot = ?self.slot, ?phase, "{}", message);
        let mut state = self.view.write();
        state.set_phase(self.slot, phase);
        state.set_status(Severity::Info, message);
    }

    /// Record the terminal phase and status line for `outcome`
    pub fn finish<T>(mut self, outcome: &Result<T>, success_message: &str) {
        let mut state = self.view.write();
        match outcome {
            Ok(_) => {
                info!(slot = ?self.slot, "{}", success_message);
                state.set_phase(self.slot, ActionPhase::Success);
                state.set_status(Severity::Success, success_message);
            }
            // Abandoned by a disconnect or account change; that status stays
            Err(SessionError::Cancelled) => {
                info!(slot = ?self.slot, "Action cancelled");
                state.set_phase(self.slot, ActionPhase::Error);
            }
            Err(err) => {
                warn!(slot = ?self.slot, error = %err, "Action failed");
                state.set_phase(self.slot, ActionPhase::Error);
                state.set_status(Severity::Error, err.status_message(self.slot));
            }
        }
        self.finished = true;
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.view.write().set_phase(self.slot, ActionPhase::Idle);
        }
    }
}
