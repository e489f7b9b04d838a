use crate::entities::PaymentRequest;
use crate::processors::{ListenerContext, ListenerHandle, ListenerSnapshot, PaymentListener};
use alloy::primitives::U256;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("payment request {0} not found")]
    NotFound(Uuid),

    #[error("payment request {existing} is already waiting for an amount of {amount} base units")]
    AmountInFlight { amount: U256, existing: Uuid },
}

struct RegisteredListener {
    expected_amount: U256,
    split_percentage: u8,
    handle: ListenerHandle,
}

/// Registered view of one payment, running or finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerEntry {
    pub request_id: Uuid,
    pub expected_amount: U256,
    pub split_percentage: u8,
    pub snapshot: ListenerSnapshot,
}

/// Owns the handles of all listeners started by the agent.
///
/// Finished listeners stay registered for the configured retention so their
/// outcome can still be read, and are dropped on the next `start` after that.
pub struct ListenerRegistry {
    ctx: ListenerContext,
    listeners: RwLock<HashMap<Uuid, RegisteredListener>>,
}

impl ListenerRegistry {
    pub fn new(ctx: ListenerContext) -> Self {
        Self {
            ctx,
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Spawn a listener for `request`.
    ///
    /// Fails when another polling request expects the same amount, unless
    /// duplicates are allowed by configuration.
    pub async fn start(&self, request: PaymentRequest) -> Result<ListenerEntry, RegistryError> {
        let mut listeners = self.listeners.write().await;
        self.prune_expired(&mut listeners);

        if !self.ctx.config.allow_duplicate_amounts {
            let clash = listeners.iter().find(|(_, listener)| {
                listener.expected_amount == request.expected_amount
                    && !listener.handle.status().is_terminal()
            });
            if let Some((existing, _)) = clash {
                return Err(RegistryError::AmountInFlight {
                    amount: request.expected_amount,
                    existing: *existing,
                });
            }
        }

        let request_id = request.id;
        let expected_amount = request.expected_amount;
        let split_percentage = request.split.get();
        let handle = PaymentListener::spawn(request, self.ctx.clone());
        let entry = ListenerEntry {
            request_id,
            expected_amount,
            split_percentage,
            snapshot: handle.snapshot(),
        };
        listeners.insert(
            request_id,
            RegisteredListener {
                expected_amount,
                split_percentage,
                handle,
            },
        );
        debug!(request_id = %request_id, active = listeners.len(), "Listener registered");
        Ok(entry)
    }

    pub async fn get(&self, request_id: Uuid) -> Option<ListenerEntry> {
        let listeners = self.listeners.read().await;
        listeners
            .get(&request_id)
            .map(|listener| Self::entry(request_id, listener))
    }

    /// Stop the listener of `request_id`. Stopping a finished listener is a no-op.
    pub async fn stop(&self, request_id: Uuid) -> Result<ListenerEntry, RegistryError> {
        let listeners = self.listeners.read().await;
        let listener = listeners
            .get(&request_id)
            .ok_or(RegistryError::NotFound(request_id))?;
        listener.handle.stop();
        Ok(Self::entry(request_id, listener))
    }

    /// Stop every listener and wait for all of them to finish.
    pub async fn shutdown(&self) {
        let drained: Vec<_> = {
            let mut listeners = self.listeners.write().await;
            listeners.drain().map(|(_, listener)| listener.handle).collect()
        };
        info!(listeners = drained.len(), "Stopping payment listeners");
        for handle in &drained {
            handle.stop();
        }
        for handle in drained {
            handle.join().await;
        }
    }

    fn prune_expired(&self, listeners: &mut HashMap<Uuid, RegisteredListener>) {
        let now = self.ctx.clock.now();
        let retention = self.ctx.config.retention;
        let before = listeners.len();
        listeners.retain(|_, listener| {
            let snapshot = listener.handle.snapshot();
            match snapshot.finished_at {
                Some(finished_at) => now.saturating_duration_since(finished_at) <= retention,
                None => true,
            }
        });
        let pruned = before - listeners.len();
        if pruned > 0 {
            debug!(pruned, remaining = listeners.len(), "Pruned finished listeners");
        }
    }

    fn entry(request_id: Uuid, listener: &RegisteredListener) -> ListenerEntry {
        ListenerEntry {
            request_id,
            expected_amount: listener.expected_amount,
            split_percentage: listener.split_percentage,
            snapshot: listener.handle.snapshot(),
        }
    }
}
