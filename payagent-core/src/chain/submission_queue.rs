use alloy::primitives::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes transaction submission per signing account.
///
/// Two distributions sharing one operating account would otherwise race on
/// its nonce. Holding the guard returned by [`acquire`](Self::acquire) for
/// the whole distribution keeps both transfers of one payment together.
#[derive(Debug, Clone, Default)]
pub struct AccountSubmissionQueue {
    locks: Arc<Mutex<HashMap<Address, Arc<Mutex<()>>>>>,
}

impl AccountSubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `account`.
    ///
    /// Waiters are served in FIFO order.
    pub async fn acquire(&self, account: Address) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(account).or_default().clone()
        };
        lock.lock_owned().await
    }
}
