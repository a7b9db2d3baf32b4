//! In-memory snapshot of the remote tool catalog.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::{ToolDescriptor, ToolsApi};
use crate::error::RegistryError;

/// Owns the current catalog snapshot.
///
/// The snapshot is replaced wholesale by [`ToolRegistry::refresh`]; readers
/// always get a complete list, either the previous one or the new one.
pub struct ToolRegistry<A> {
    api: Arc<A>,
    snapshot: RwLock<Arc<Vec<ToolDescriptor>>>,
}

impl<A: ToolsApi> ToolRegistry<A> {
    /// Create an empty registry backed by `api`.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Fetch the catalog and swap it in.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn refresh(&self) -> Result<Arc<Vec<ToolDescriptor>>, RegistryError> {
        let fetched = self.api.fetch_tools().await?;
        let tools = Arc::new(dedupe(fetched));

        *self.snapshot.write().await = Arc::clone(&tools);
        info!(count = tools.len(), "tool registry refreshed");

        Ok(tools)
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<Vec<ToolDescriptor>> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Find a tool by exact name in the current snapshot.
    pub async fn lookup(&self, name: &str) -> Option<ToolDescriptor> {
        self.snapshot
            .read()
            .await
            .iter()
            .find(|t| t.name == name)
            .cloned()
    }
}

/// Keep the first descriptor for each name.
fn dedupe(tools: Vec<ToolDescriptor>) -> Vec<ToolDescriptor> {
    let mut seen = HashSet::new();
    tools
        .into_iter()
        .filter(|t| {
            let first = seen.insert(t.name.clone());
            if !first {
                warn!(tool = %t.name, "duplicate tool name in catalog, keeping first");
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ParameterSchema;
    use crate::error::ApiError;
    use serde_json::{Map, Value};
    use std::sync::Mutex;

    fn descriptor(name: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: name.to_string(),
            description: format!("{name} tool"),
            parameters: ParameterSchema::default(),
        }
    }

    /// Serves queued catalog responses in order.
    #[derive(Default)]
    struct QueuedCatalog {
        responses: Mutex<Vec<Result<Vec<ToolDescriptor>, ApiError>>>,
    }

    impl QueuedCatalog {
        fn with(responses: Vec<Result<Vec<ToolDescriptor>, ApiError>>) -> Arc<Self> {
            let mut responses = responses;
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    impl ToolsApi for QueuedCatalog {
        async fn fetch_tools(&self) -> Result<Vec<ToolDescriptor>, ApiError> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn invoke(&self, _tool: &str, _arguments: &Map<String, Value>) -> Result<Value, ApiError> {
            unreachable!("registry never invokes tools")
        }
    }

    #[tokio::test]
    async fn starts_empty() {
        let registry = ToolRegistry::new(QueuedCatalog::with(vec![]));
        assert!(registry.snapshot().await.is_empty());
        assert!(registry.lookup("anything").await.is_none());
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot() {
        let registry = ToolRegistry::new(QueuedCatalog::with(vec![
            Ok(vec![descriptor("a"), descriptor("b")]),
            Ok(vec![descriptor("c")]),
        ]));

        registry.refresh().await.unwrap();
        assert!(registry.lookup("a").await.is_some());

        let tools = registry.refresh().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert!(registry.lookup("a").await.is_none());
        assert!(registry.lookup("c").await.is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let registry = ToolRegistry::new(QueuedCatalog::with(vec![
            Ok(vec![descriptor("a")]),
            Err(ApiError::Transport("connection refused".to_string())),
        ]));

        registry.refresh().await.unwrap();
        let err = registry.refresh().await.unwrap_err();

        assert!(matches!(err, RegistryError::Fetch(ApiError::Transport(_))));
        assert!(registry.lookup("a").await.is_some());
    }

    #[tokio::test]
    async fn lookup_is_exact_match() {
        let registry = ToolRegistry::new(QueuedCatalog::with(vec![Ok(vec![descriptor("probe")])]));
        registry.refresh().await.unwrap();

        assert!(registry.lookup("Probe").await.is_none());
        assert!(registry.lookup("probe ").await.is_none());
        assert!(registry.lookup("probe").await.is_some());
    }

    #[tokio::test]
    async fn duplicate_names_keep_first() {
        let mut second = descriptor("a");
        second.description = "shadowed".to_string();
        let registry = ToolRegistry::new(QueuedCatalog::with(vec![Ok(vec![
            descriptor("a"),
            second,
            descriptor("b"),
        ])]));

        let tools = registry.refresh().await.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(registry.lookup("a").await.unwrap().description, "a tool");
    }
}
