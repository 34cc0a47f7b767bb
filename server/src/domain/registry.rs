//! Live plugin instances keyed by datasource id
//!
//! Instances are created on first use from the configured connection
//! settings and kept until disposed. Settings are fixed for the lifetime of
//! the registry; dispose an id to force a reconnect.
//!
//! The map lock is only held to look up or insert a per-id cell. Connecting
//! happens on that cell, so a slow or unreachable cluster only delays
//! callers of the same id.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{OnceCell, RwLock};

use super::frames::FrameOptions;
use super::plugin::Plugin;
use crate::core::config::DatasourceConfig;
use crate::data::{CassandraSession, DataError, Repository};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("unknown datasource: {0}")]
    UnknownDatasource(String),

    #[error("failed to create datasource {id}: {source}")]
    Create {
        id: String,
        #[source]
        source: DataError,
    },
}

/// Opens the repository behind a new plugin instance
#[async_trait]
pub trait PluginFactory: Send + Sync {
    async fn connect(&self, config: &DatasourceConfig) -> Result<Arc<dyn Repository>, DataError>;
}

/// Factory backed by a scylla driver session
pub struct CassandraPluginFactory;

#[async_trait]
impl PluginFactory for CassandraPluginFactory {
    async fn connect(&self, config: &DatasourceConfig) -> Result<Arc<dyn Repository>, DataError> {
        let session = CassandraSession::connect(config).await?;
        Ok(Arc::new(session))
    }
}

pub struct DatasourceRegistry {
    configs: BTreeMap<String, DatasourceConfig>,
    options: FrameOptions,
    factory: Arc<dyn PluginFactory>,
    instances: RwLock<HashMap<String, Arc<Slot>>>,
}

/// Instance cell for one datasource; empty until a connect succeeds
type Slot = OnceCell<Arc<Plugin>>;

impl DatasourceRegistry {
    pub fn new(
        configs: BTreeMap<String, DatasourceConfig>,
        options: FrameOptions,
        factory: Arc<dyn PluginFactory>,
    ) -> Self {
        Self {
            configs,
            options,
            factory,
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Configured datasource ids, sorted
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    /// Return the live instance for `id`, creating it on first use
    pub async fn get_or_create(&self, id: &str) -> Result<Arc<Plugin>, RegistryError> {
        if let Some(plugin) = self
            .instances
            .read()
            .await
            .get(id)
            .and_then(|slot| slot.get())
        {
            return Ok(plugin.clone());
        }

        let config = self
            .configs
            .get(id)
            .ok_or_else(|| RegistryError::UnknownDatasource(id.to_string()))?;

        let slot = self
            .instances
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .clone();

        // Concurrent callers for the same id wait here; a failed connect
        // leaves the cell empty for the next caller to retry
        let plugin = slot
            .get_or_try_init(|| async {
                tracing::debug!(datasource = %id, "Creating datasource instance");
                let repo = self.factory.connect(config).await.map_err(|source| {
                    RegistryError::Create {
                        id: id.to_string(),
                        source,
                    }
                })?;
                tracing::info!(datasource = %id, "Datasource connected");
                Ok::<_, RegistryError>(Arc::new(Plugin::new(repo, self.options.clone())))
            })
            .await?;
        Ok(plugin.clone())
    }

    /// Close and forget the instance for `id`. Returns false if none was live.
    pub async fn dispose(&self, id: &str) -> bool {
        let removed = self.instances.write().await.remove(id);
        match removed.as_deref().and_then(Slot::get) {
            Some(plugin) => {
                plugin.dispose().await;
                tracing::debug!(datasource = %id, "Datasource disposed");
                true
            }
            None => false,
        }
    }

    pub async fn dispose_all(&self) {
        let drained: Vec<Arc<Plugin>> = self
            .instances
            .write()
            .await
            .drain()
            .filter_map(|(_, slot)| slot.get().cloned())
            .collect();
        let count = drained.len();
        futures::future::join_all(drained.iter().map(|plugin| plugin.dispose())).await;
        tracing::debug!(count, "All datasources disposed");
    }

    #[cfg(test)]
    pub async fn live_count(&self) -> usize {
        self.instances
            .read()
            .await
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use crate::data::mock::MockRepository;

    /// Hands out mock repositories and remembers them
    #[derive(Default)]
    pub(crate) struct MockFactory {
        pub connects: AtomicUsize,
        pub repos: Mutex<Vec<Arc<MockRepository>>>,
        pub make: Option<fn() -> MockRepository>,
        pub fail: bool,
    }

    #[async_trait]
    impl PluginFactory for MockFactory {
        async fn connect(
            &self,
            _config: &DatasourceConfig,
        ) -> Result<Arc<dyn Repository>, DataError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DataError::connection("no hosts available"));
            }
            let repo = Arc::new(self.make.map(|make| make()).unwrap_or_default());
            self.repos.lock().unwrap().push(repo.clone());
            Ok(repo)
        }
    }

    pub(crate) fn configs(ids: &[&str]) -> BTreeMap<String, DatasourceConfig> {
        ids.iter()
            .map(|id| {
                (
                    id.to_string(),
                    DatasourceConfig {
                        hosts: vec!["127.0.0.1:9042".into()],
                        consistency: "ONE".into(),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    fn registry(factory: Arc<MockFactory>) -> DatasourceRegistry {
        DatasourceRegistry::new(configs(&["a", "b"]), FrameOptions::default(), factory)
    }

    #[tokio::test]
    async fn test_creates_on_miss_and_reuses() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry(factory.clone());

        let first = registry.get_or_create("a").await.unwrap();
        let second = registry.get_or_create("a").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);

        registry.get_or_create("b").await.unwrap();
        assert_eq!(registry.live_count().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_datasource() {
        let registry = registry(Arc::new(MockFactory::default()));
        let err = registry.get_or_create("zzz").await.err().unwrap();
        assert!(matches!(err, RegistryError::UnknownDatasource(id) if id == "zzz"));
    }

    #[tokio::test]
    async fn test_create_failure_is_not_cached() {
        let factory = Arc::new(MockFactory {
            fail: true,
            ..Default::default()
        });
        let registry = registry(factory.clone());

        assert!(matches!(
            registry.get_or_create("a").await,
            Err(RegistryError::Create { .. })
        ));
        assert!(registry.get_or_create("a").await.is_err());
        assert_eq!(factory.connects.load(Ordering::SeqCst), 2);
        assert_eq!(registry.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_dispose_closes_and_forgets() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry(factory.clone());

        registry.get_or_create("a").await.unwrap();
        assert!(registry.dispose("a").await);
        assert!(!registry.dispose("a").await);
        assert!(factory.repos.lock().unwrap()[0].is_closed());

        registry.get_or_create("a").await.unwrap();
        assert_eq!(factory.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dispose_all() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry(factory.clone());
        registry.get_or_create("a").await.unwrap();
        registry.get_or_create("b").await.unwrap();

        registry.dispose_all().await;
        assert_eq!(registry.live_count().await, 0);
        assert!(factory.repos.lock().unwrap().iter().all(|r| r.is_closed()));
    }

    /// Stalls connects to datasources whose keyspace is `slow`
    struct StallingFactory;

    #[async_trait]
    impl PluginFactory for StallingFactory {
        async fn connect(
            &self,
            config: &DatasourceConfig,
        ) -> Result<Arc<dyn Repository>, DataError> {
            if config.keyspace.as_deref() == Some("slow") {
                tokio::time::sleep(Duration::from_millis(800)).await;
            }
            Ok(Arc::new(MockRepository::default()))
        }
    }

    #[tokio::test]
    async fn test_slow_connect_does_not_block_other_datasources() {
        let mut configs = configs(&["fast", "slow"]);
        if let Some(slow) = configs.get_mut("slow") {
            slow.keyspace = Some("slow".into());
        }
        let registry = Arc::new(DatasourceRegistry::new(
            configs,
            FrameOptions::default(),
            Arc::new(StallingFactory),
        ));
        registry.get_or_create("fast").await.unwrap();

        let connecting = tokio::spawn({
            let registry = registry.clone();
            async move { registry.get_or_create("slow").await.map(|_| ()) }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        registry.get_or_create("fast").await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(200));
        assert_eq!(registry.live_count().await, 1);

        connecting.await.unwrap().unwrap();
        assert_eq!(registry.live_count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_connects_once() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry(factory.clone());

        let (first, second) =
            tokio::join!(registry.get_or_create("a"), registry.get_or_create("a"));
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ids_sorted() {
        let registry = registry(Arc::new(MockFactory::default()));
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
