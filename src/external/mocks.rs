use crate::asset::{AccountId, AssetRef, Balance, ChainId};
use crate::errors::ExecutionError;
use crate::external::{
    CallData, ChainConnection, ResolvedTransfer, SigningProvider, SnapshotFetcher, TransferResolver,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory chain connection with configurable per-submission failures.
pub struct MockConnection {
    fee: Balance,
    fail_submission_at: Option<usize>,
    submissions: Mutex<Vec<CallData>>,
    fee_estimations: AtomicUsize,
}

impl MockConnection {
    pub fn new(fee: Balance) -> Self {
        Self {
            fee,
            fail_submission_at: None,
            submissions: Mutex::new(Vec::new()),
            fee_estimations: AtomicUsize::new(0),
        }
    }

    /// Fail the nth submission (zero-based); earlier ones succeed.
    pub fn failing_at(fee: Balance, nth: usize) -> Self {
        Self { fail_submission_at: Some(nth), ..Self::new(fee) }
    }

    pub fn submissions(&self) -> Vec<CallData> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn fee_estimations(&self) -> usize {
        self.fee_estimations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainConnection for MockConnection {
    async fn estimate_call_fee(
        &self,
        _chain: &ChainId,
        _call: &CallData,
    ) -> Result<Balance, ExecutionError> {
        self.fee_estimations.fetch_add(1, Ordering::SeqCst);
        Ok(self.fee)
    }

    async fn submit_and_confirm(
        &self,
        chain: &ChainId,
        call: &CallData,
        _signer: &AccountId,
    ) -> Result<Balance, ExecutionError> {
        let submitted_so_far = {
            let mut submissions = self.submissions.lock().unwrap();
            submissions.push(call.clone());
            submissions.len() - 1
        };

        if self.fail_submission_at == Some(submitted_so_far) {
            return Err(ExecutionError::Submission {
                chain: chain.clone(),
                reason: "mock submission failure".to_string(),
            });
        }

        // Amounts are encoded as decimal strings, u128 does not fit a JSON number.
        let amount = call
            .payload
            .get("amount_in")
            .and_then(|value| value.as_str())
            .and_then(|value| value.parse::<Balance>().ok())
            .unwrap_or(0);

        Ok(amount)
    }
}

/// Signing provider backed by a chain -> account map.
#[derive(Default)]
pub struct MockSigner {
    accounts: HashMap<ChainId, AccountId>,
}

impl MockSigner {
    pub fn with_account(mut self, chain: impl Into<ChainId>, account: AccountId) -> Self {
        self.accounts.insert(chain.into(), account);
        self
    }

    /// Resolves the same account for every chain.
    pub fn universal(account: AccountId) -> UniversalSigner {
        UniversalSigner { account }
    }
}

impl SigningProvider for MockSigner {
    fn resolve_account(&self, chain: &ChainId) -> Option<AccountId> {
        self.accounts.get(chain).copied()
    }
}

pub struct UniversalSigner {
    account: AccountId,
}

impl SigningProvider for UniversalSigner {
    fn resolve_account(&self, _chain: &ChainId) -> Option<AccountId> {
        Some(self.account)
    }
}

/// Transfer resolver returning a fixed fee model.
pub struct MockResolver {
    pub protocol_fee: Balance,
    pub fee_deducted_from_amount: bool,
    pub reserve_chain: Option<ChainId>,
}

impl MockResolver {
    pub fn new(protocol_fee: Balance, fee_deducted_from_amount: bool) -> Self {
        Self { protocol_fee, fee_deducted_from_amount, reserve_chain: None }
    }
}

#[async_trait]
impl TransferResolver for MockResolver {
    async fn resolve_route(
        &self,
        _origin: &AssetRef,
        _destination: &AssetRef,
        _destination_account: &AccountId,
    ) -> Result<ResolvedTransfer, ExecutionError> {
        Ok(ResolvedTransfer {
            reserve_chain: self.reserve_chain.clone(),
            protocol_fee: self.protocol_fee,
            fee_deducted_from_amount: self.fee_deducted_from_amount,
        })
    }
}

/// Snapshot fetcher yielding values from a queue, with an optional artificial
/// delay so tests can race triggers against in-flight fetches.
pub struct MockFetcher<S> {
    values: Mutex<Vec<eyre::Result<S>>>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl<S> MockFetcher<S> {
    pub fn new(values: Vec<eyre::Result<S>>) -> Self {
        let mut values = values;
        values.reverse();
        Self { values: Mutex::new(values), delay: None, fetches: AtomicUsize::new(0) }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl<S: Clone> MockFetcher<S> {
    /// Always yields the same snapshot.
    pub fn constant(value: S) -> ConstantFetcher<S> {
        ConstantFetcher { value }
    }
}

#[async_trait]
impl<S: Clone + Send + Sync + 'static> SnapshotFetcher<S> for MockFetcher<S> {
    async fn fetch(&self) -> eyre::Result<S> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.values.lock().unwrap().pop();
        match next {
            Some(result) => result,
            None => Err(eyre::eyre!("mock fetcher exhausted")),
        }
    }
}

pub struct ConstantFetcher<S> {
    value: S,
}

#[async_trait]
impl<S: Clone + Send + Sync + 'static> SnapshotFetcher<S> for ConstantFetcher<S> {
    async fn fetch(&self) -> eyre::Result<S> {
        Ok(self.value.clone())
    }
}
