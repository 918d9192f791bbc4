use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Chain balances are handled as raw planck-style integers.
pub type Balance = u128;

/// Identifier of a chain the engine can route through.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for ChainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Chain-qualified identifier of a tradeable asset. Used as the node key of
/// the exchange graph and as a map key everywhere else.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetRef {
    pub chain: ChainId,
    pub asset: u32,
}

impl AssetRef {
    pub fn new(chain: impl Into<ChainId>, asset: u32) -> Self {
        Self { chain: chain.into(), asset }
    }

    /// Stable byte representation used for path hashing.
    pub fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = self.chain.as_str().as_bytes().to_vec();
        bytes.extend_from_slice(&self.asset.to_le_bytes());
        bytes
    }
}

impl From<&str> for AssetRef {
    /// Native (index 0) asset of the given chain.
    fn from(chain: &str) -> Self {
        Self::new(chain, 0)
    }
}

impl Display for AssetRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chain, self.asset)
    }
}

impl Debug for AssetRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chain, self.asset)
    }
}

/// Opaque account identifier resolved by the signing provider.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn repeat_byte(byte: u8) -> Self {
        Self([byte; 32])
    }
}

impl Debug for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…")
    }
}

/// Hash of a finalized block, delivered by the per-chain block trigger.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    pub fn repeat_byte(byte: u8) -> Self {
        Self([byte; 32])
    }
}

impl Debug for BlockHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
