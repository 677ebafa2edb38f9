// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::status::{OverallStatus, ServiceStatusHandle, StatusGauge};
use core_types::{
    ActionKey, ActionState, Address, CandidateIndex, PendingAction, PollIndex, TxHash,
};
use ledger_client::{
    Confirmation, ConfirmationTracker, ContractCall, LedgerWriter, Signer, SignerError,
};
use log::{debug, info, warn};
use parking_lot::RwLock;
use poll_registry::{PollRegistry, PollSnapshot};
use std::sync::Arc;

use crate::error::{EngineResult, ValidationError};
use crate::pending::{PendingActions, PendingSlot};
use crate::session::SessionStore;
use crate::surface::{action_message, load_message, ErrorSurface};
use crate::view::EngineView;

/// Outcome of a confirmed mutating action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionReport {
    pub key: ActionKey,
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Generation of the installed snapshot once the post-confirmation reload finished;
    /// `None` if that reload failed.
    pub snapshot_generation: Option<u64>,
}

/// Drives simulate → submit → confirm → refresh for every mutating action and owns
/// the pending markers, the connected account, and the error surface.
pub struct ActionOrchestrator {
    registry: PollRegistry,
    writer: Arc<dyn LedgerWriter>,
    tracker: Arc<dyn ConfirmationTracker>,
    signer: Arc<dyn Signer>,
    account: RwLock<Option<Address>>,
    pending: PendingActions,
    surface: ErrorSurface,
    session: Option<SessionStore>,
    status: ServiceStatusHandle,
}

impl ActionOrchestrator {
    pub fn new(
        registry: PollRegistry,
        writer: Arc<dyn LedgerWriter>,
        tracker: Arc<dyn ConfirmationTracker>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        let status = ServiceStatusHandle::new("orchestrator");
        status.set_overall(OverallStatus::Ok);
        Self {
            registry,
            writer,
            tracker,
            signer,
            account: RwLock::new(None),
            pending: PendingActions::new(),
            surface: ErrorSurface::new(),
            session: None,
            status,
        }
    }

    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        self.session = Some(store);
        self
    }

    pub fn registry(&self) -> &PollRegistry {
        &self.registry
    }

    pub fn status_handle(&self) -> ServiceStatusHandle {
        self.status.clone()
    }

    pub fn account(&self) -> Option<Address> {
        *self.account.read()
    }

    pub async fn connect(&self) -> EngineResult<Address> {
        match self.request_account().await {
            Ok(account) => {
                info!("[orchestrator] connected {}", account.short());
                Ok(account)
            }
            Err(err) => {
                warn!("[orchestrator] connect failed: {err}");
                self.surface.set(err.to_string());
                Err(err)
            }
        }
    }

    async fn request_account(&self) -> EngineResult<Address> {
        let accounts = self.signer.request_addresses().await?;
        let account = accounts
            .first()
            .copied()
            .ok_or(SignerError::NoAccounts)?;
        *self.account.write() = Some(account);
        if let Some(store) = &self.session {
            if let Err(err) = store.record_connected(account) {
                warn!("[orchestrator] could not persist session: {err}");
            }
        }
        Ok(account)
    }

    /// Restores a previous connection without prompting, if the session says there was one.
    pub async fn auto_connect(&self) -> EngineResult<Option<Address>> {
        let Some(store) = &self.session else {
            return Ok(None);
        };
        let state = store.load()?;
        if !state.wallet_connected {
            return Ok(None);
        }
        let exposed = self.signer.accounts().await?;
        if exposed.is_empty() {
            debug!("[orchestrator] wallet exposes no authorized accounts; staying disconnected");
            return Ok(None);
        }
        self.connect().await.map(Some)
    }

    /// Reuses the last session's authorization when possible, otherwise prompts the wallet.
    /// A session that cannot be restored is logged and treated as absent.
    pub async fn resume_or_connect(&self) -> EngineResult<Address> {
        match self.auto_connect().await {
            Ok(Some(account)) => return Ok(account),
            Ok(None) => {}
            Err(err) => warn!("[orchestrator] auto-connect failed: {err}"),
        }
        self.connect().await
    }

    /// Local only; nothing is sent to the ledger or the wallet.
    pub fn disconnect(&self) {
        let previous = self.account.write().take();
        if let Some(store) = &self.session {
            if let Err(err) = store.record_disconnected() {
                warn!("[orchestrator] could not persist session: {err}");
            }
        }
        if let Some(account) = previous {
            info!("[orchestrator] disconnected {}", account.short());
        }
    }

    pub async fn refresh(&self) -> EngineResult<Arc<PollSnapshot>> {
        match self.registry.refresh().await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                self.surface.set(load_message(&err));
                Err(err.into())
            }
        }
    }

    pub async fn create_poll(
        &self,
        title: &str,
        candidates: &[String],
    ) -> EngineResult<ActionReport> {
        let key = ActionKey::create_poll();
        let outcome = self.try_create_poll(key, title, candidates).await;
        self.settle(key, outcome)
    }

    async fn try_create_poll(
        &self,
        key: ActionKey,
        title: &str,
        candidates: &[String],
    ) -> EngineResult<ActionReport> {
        let from = self.require_account()?;
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let names: Vec<String> = candidates
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        if names.len() < 2 {
            return Err(ValidationError::TooFewCandidates { found: names.len() }.into());
        }
        let slot = self.pending.begin(key)?;
        let call = ContractCall::CreatePoll {
            title: title.to_string(),
            candidates: names,
        };
        self.execute(slot, call, from).await
    }

    pub async fn vote(
        &self,
        poll: PollIndex,
        candidate: CandidateIndex,
    ) -> EngineResult<ActionReport> {
        let key = ActionKey::vote(poll, candidate);
        let outcome = self.try_vote(key, poll, candidate).await;
        self.settle(key, outcome)
    }

    async fn try_vote(
        &self,
        key: ActionKey,
        poll: PollIndex,
        candidate: CandidateIndex,
    ) -> EngineResult<ActionReport> {
        let from = self.require_account()?;
        let slot = self.pending.begin(key)?;
        {
            let snapshot = self.registry.snapshot();
            let target = snapshot
                .poll(poll)
                .ok_or(ValidationError::UnknownPoll { poll })?;
            if !target.active {
                return Err(ValidationError::PollInactive { poll }.into());
            }
            if target.candidate(candidate).is_none() {
                return Err(ValidationError::UnknownCandidate { poll, candidate }.into());
            }
        }
        self.execute(slot, ContractCall::Vote { poll, candidate }, from)
            .await
    }

    pub async fn end_poll(&self, poll: PollIndex) -> EngineResult<ActionReport> {
        let key = ActionKey::end_poll(poll);
        let outcome = self.try_end_poll(key, poll).await;
        self.settle(key, outcome)
    }

    async fn try_end_poll(&self, key: ActionKey, poll: PollIndex) -> EngineResult<ActionReport> {
        let from = self.require_account()?;
        let slot = self.pending.begin(key)?;
        self.execute(slot, ContractCall::EndPoll { poll }, from)
            .await
    }

    fn require_account(&self) -> Result<Address, ValidationError> {
        self.account().ok_or(ValidationError::NotConnected)
    }

    async fn execute(
        &self,
        slot: PendingSlot,
        call: ContractCall,
        from: Address,
    ) -> EngineResult<ActionReport> {
        let key = slot.key();
        let confirmation = match self.drive(&slot, call, from).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                slot.finish(ActionState::Failed);
                return Err(err);
            }
        };
        slot.advance(ActionState::Done);
        // The pending marker stays up until the reload lands.
        let snapshot_generation = match self.registry.refresh().await {
            // A newer concurrent refresh may have superseded ours.
            Ok(_) => Some(self.registry.snapshot().generation),
            Err(err) => {
                warn!("[orchestrator] {key} confirmed but reload failed: {err}");
                self.surface.set(load_message(&err));
                None
            }
        };
        slot.finish(ActionState::Done);
        Ok(ActionReport {
            key,
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
            snapshot_generation,
        })
    }

    async fn drive(
        &self,
        slot: &PendingSlot,
        call: ContractCall,
        from: Address,
    ) -> EngineResult<Confirmation> {
        let key = slot.key();
        debug!("[orchestrator] {key}: simulating from {}", from.short());
        let request = self.writer.simulate(&call, from).await?;
        let tx_hash = self.writer.submit(request).await?;
        slot.submitted(tx_hash);
        info!("[orchestrator] {key}: submitted {tx_hash}");
        slot.advance(ActionState::Confirming);
        let confirmation = self.tracker.await_confirmation(tx_hash).await?;
        info!(
            "[orchestrator] {key}: confirmed in block {}",
            confirmation.block_number
        );
        Ok(confirmation)
    }

    fn settle(
        &self,
        key: ActionKey,
        outcome: EngineResult<ActionReport>,
    ) -> EngineResult<ActionReport> {
        match &outcome {
            Ok(_) => {
                self.status.set_overall(OverallStatus::Ok);
                self.status.clear_errors_matching(|_| true);
            }
            Err(err) => {
                let message = action_message(key.kind, err);
                if err.is_validation() {
                    debug!("[orchestrator] {key} rejected: {err}");
                } else {
                    warn!("[orchestrator] {key} failed: {err}");
                    self.status.set_overall(OverallStatus::Warn);
                    self.status.replace_errors(message.clone());
                }
                self.surface.set(message);
            }
        }
        self.status
            .set_gauges(vec![StatusGauge::new("pending_actions", self.pending.len() as f64)]);
        outcome
    }

    pub fn pending(&self) -> Vec<PendingAction> {
        self.pending.snapshot()
    }

    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.pending.is_pending(key)
    }

    pub fn last_error(&self) -> Option<String> {
        self.surface.current()
    }

    pub fn clear_error(&self) {
        self.surface.clear();
    }

    pub fn view(&self) -> EngineView {
        EngineView {
            snapshot: self.registry.snapshot(),
            pending: self.pending.snapshot(),
            error: self.surface.current(),
            account: self.account(),
            loading: self.registry.is_loading(),
        }
    }
}

impl std::fmt::Debug for ActionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionOrchestrator")
            .field("account", &self.account())
            .field("pending", &self.pending.len())
            .field("error", &self.surface.current())
            .finish()
    }
}
