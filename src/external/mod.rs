//! External collaborators
//!
//! The engine consumes narrow interfaces for everything outside its scope:
//! chain connectivity, finalized-block triggers, account resolution/signing
//! and cross-chain transfer route resolution. Production implementations live
//! with the surrounding wallet; the engine only ever talks through these
//! traits.
pub mod mocks;

use crate::asset::{AccountId, AssetRef, Balance, BlockHash, ChainId};
use crate::errors::ExecutionError;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// A call ready for submission, already encoded by the runtime/codec layer.
/// The engine treats the payload as opaque; `section`/`method` exist for
/// logging and for mock-side assertions.
#[derive(Clone, Debug, PartialEq)]
pub struct CallData {
    pub section: &'static str,
    pub method: &'static str,
    pub payload: serde_json::Value,
}

/// Per-chain request/response transport able to dry-run a call for its fee
/// and to submit it signed. Retry policy is the transport's own business.
#[async_trait]
pub trait ChainConnection: Send + Sync {
    /// Read-only fee estimation; must not mutate chain state.
    async fn estimate_call_fee(
        &self,
        chain: &ChainId,
        call: &CallData,
    ) -> Result<Balance, ExecutionError>;

    /// Submits the signed call and waits for on-chain confirmation. Returns
    /// the amount delivered to the beneficiary.
    async fn submit_and_confirm(
        &self,
        chain: &ChainId,
        call: &CallData,
        signer: &AccountId,
    ) -> Result<Balance, ExecutionError>;
}

/// Resolves the active account per chain. The engine never touches keys; a
/// resolved account doubles as proof that a signer exists for that chain.
pub trait SigningProvider: Send + Sync {
    fn resolve_account(&self, chain: &ChainId) -> Option<AccountId>;
}

/// Concrete transfer route between two chains plus its protocol fee model,
/// resolved by the cross-chain machinery at execution time.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTransfer {
    /// Intermediate reserve chain the transfer is routed through, if any.
    pub reserve_chain: Option<ChainId>,
    pub protocol_fee: Balance,
    /// Whether the protocol fee is deducted from the moving balance rather
    /// than from the payer's free balance.
    pub fee_deducted_from_amount: bool,
}

#[async_trait]
pub trait TransferResolver: Send + Sync {
    async fn resolve_route(
        &self,
        origin: &AssetRef,
        destination: &AssetRef,
        destination_account: &AccountId,
    ) -> Result<ResolvedTransfer, ExecutionError>;
}

/// Typed decode of one venue's on-chain state at the latest finalized block.
/// Stands in for the runtime/codec layer; each remote state cache owns one.
#[async_trait]
pub trait SnapshotFetcher<S>: Send + Sync {
    async fn fetch(&self) -> eyre::Result<S>;
}

/// Per-chain notification of new finalized block hashes. Remote state caches
/// subscribe to know when to refresh.
#[derive(Clone)]
pub struct BlockTrigger {
    sender: broadcast::Sender<BlockHash>,
}

impl BlockTrigger {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BlockHash> {
        self.sender.subscribe()
    }

    /// Announce a newly finalized block. Returns the number of listening
    /// caches; zero listeners is not an error.
    pub fn announce(&self, hash: BlockHash) -> usize {
        self.sender.send(hash).unwrap_or(0)
    }
}

impl Default for BlockTrigger {
    fn default() -> Self {
        Self::new(16)
    }
}
