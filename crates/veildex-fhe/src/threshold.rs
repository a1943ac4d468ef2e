use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use veildex_types::Amount;

use crate::ciphertext::EncUint;
use crate::clear::{ClearEngine, ClearState};
use crate::error::{FheError, Result};

/// Identifier for an outstanding threshold decryption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Cooperative decryption collaborator
///
/// The request/poll split models the asynchronous round trip through a
/// threshold network: a request is placed synchronously, the plaintexts
/// arrive whenever a quorum of key holders has contributed. Implementations
/// may resolve at the first poll (test mode) or much later (production).
pub trait ThresholdDecryptor {
    /// Place a decryption request for the given ciphertexts
    fn request(&mut self, cts: &[EncUint]) -> RequestId;

    /// Poll for the plaintexts; `None` while the quorum is incomplete
    fn poll(&mut self, id: RequestId) -> Option<Vec<Amount>>;
}

#[derive(Debug)]
struct PendingDecryption {
    handles: Vec<EncUint>,
    shares: BTreeSet<u32>,
}

/// In-process t-of-n decryption quorum over a [`ClearEngine`]'s key material
///
/// `instant` resolves every request at the first poll; `manual` withholds
/// plaintexts until `threshold` distinct members have contributed a share,
/// which is how tests exercise the suspended-reveal path
#[derive(Debug)]
pub struct LocalQuorum {
    state: Arc<Mutex<ClearState>>,
    threshold: usize,
    next_id: u64,
    pending: BTreeMap<u64, PendingDecryption>,
    served: usize,
}

impl LocalQuorum {
    /// Synchronous development mode: every request decrypts immediately
    pub fn instant(engine: &ClearEngine) -> Self {
        LocalQuorum {
            state: engine.shared(),
            threshold: 0,
            next_id: 0,
            pending: BTreeMap::new(),
            served: 0,
        }
    }

    /// Deferred mode requiring `threshold` member shares per request
    pub fn manual(engine: &ClearEngine, threshold: usize) -> Result<Self> {
        if threshold == 0 {
            return Err(FheError::InvalidThreshold);
        }
        Ok(LocalQuorum {
            state: engine.shared(),
            threshold,
            next_id: 0,
            pending: BTreeMap::new(),
            served: 0,
        })
    }

    /// Record one key holder's decryption share; duplicates are ignored
    pub fn contribute_share(&mut self, id: RequestId, member: u32) -> Result<()> {
        let entry = self
            .pending
            .get_mut(&id.0)
            .ok_or(FheError::UnknownRequest(id.0))?;
        entry.shares.insert(member);
        Ok(())
    }

    /// Number of decryption requests answered so far
    pub fn requests_served(&self) -> usize {
        self.served
    }

    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Requests still waiting on shares, oldest first
    /// Key holders read this to know what to contribute to
    pub fn pending_requests(&self) -> Vec<RequestId> {
        self.pending.keys().map(|id| RequestId(*id)).collect()
    }
}

impl ThresholdDecryptor for LocalQuorum {
    fn request(&mut self, cts: &[EncUint]) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(
            id,
            PendingDecryption {
                handles: cts.to_vec(),
                shares: BTreeSet::new(),
            },
        );
        RequestId(id)
    }

    fn poll(&mut self, id: RequestId) -> Option<Vec<Amount>> {
        let ready = self
            .pending
            .get(&id.0)
            .map(|p| p.shares.len() >= self.threshold)?;
        if !ready {
            return None;
        }
        let entry = self.pending.remove(&id.0)?;
        let state = self.state.lock().unwrap();
        let values = entry
            .handles
            .iter()
            .map(|ct| Amount::from_raw(state.plaintext(*ct)))
            .collect();
        self.served += 1;
        Some(values)
    }
}
