//! In-memory auth flow storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::auth::{AuthFlowRepository, AuthFlowState, Result};

/// In-memory auth flow store for development and testing.
///
/// Flows live in a HashMap wrapped in `Arc<RwLock<_>>`; clones share it.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlowStore {
    flows: Arc<RwLock<HashMap<String, AuthFlowState>>>,
}

impl InMemoryFlowStore {
    /// Creates a new empty in-memory flow store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthFlowRepository for InMemoryFlowStore {
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        let mut flows = self.flows.write().await;
        flows.insert(state.to_string(), flow.clone());
        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        let mut flows = self.flows.write().await;
        Ok(flows.remove(state))
    }
}
