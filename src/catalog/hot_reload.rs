use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info, warn};

use super::loader::CatalogLoader;
use super::snapshot::CatalogSnapshot;

/// Watch the catalog files and broadcast new snapshots on change.
pub struct CatalogWatcher {
    loader: CatalogLoader,
    check_interval: Duration,
    last_version: Option<String>,
}

impl CatalogWatcher {
    pub fn new(loader: CatalogLoader, check_interval: Duration) -> Self {
        CatalogWatcher {
            loader,
            check_interval,
            last_version: None,
        }
    }

    /// Start watching for catalog changes.
    ///
    /// Returns a receiver that will observe a new snapshot whenever the
    /// catalog version changes on disk.
    pub fn start(
        mut self,
    ) -> (
        watch::Receiver<Arc<CatalogSnapshot>>,
        tokio::task::JoinHandle<()>,
    ) {
        let initial = match self.loader.load() {
            Ok(snapshot) => {
                self.last_version = Some(snapshot.version.clone());
                info!(
                    version = %snapshot.version,
                    cards = snapshot.card_count(),
                    rules = snapshot.rule_count(),
                    "Loaded initial catalog"
                );
                Arc::new(snapshot)
            }
            Err(e) => {
                error!("Failed to load initial catalog: {}", e);
                Arc::new(CatalogSnapshot::empty())
            }
        };

        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut interval = interval(self.check_interval);

            loop {
                interval.tick().await;

                match self.check_for_updates(&tx) {
                    Ok(true) => info!("Catalog reloaded successfully"),
                    Ok(false) => {} // No changes
                    Err(e) => warn!("Error checking for catalog updates: {}", e),
                }
            }
        });

        (rx, handle)
    }

    fn check_for_updates(
        &mut self,
        tx: &watch::Sender<Arc<CatalogSnapshot>>,
    ) -> Result<bool, super::loader::CatalogError> {
        let version = self.loader.load_version()?;

        if self.last_version.as_ref() == Some(&version) {
            return Ok(false);
        }

        let snapshot = self.loader.load()?;

        info!(
            "Catalog version changed: {:?} -> {}",
            self.last_version, snapshot.version
        );

        self.last_version = Some(snapshot.version.clone());
        let _ = tx.send(Arc::new(snapshot));

        Ok(true)
    }
}

/// Watcher over an async catalog source (e.g. Postgres).
///
/// Same contract as [`CatalogWatcher`], but polls an upstream store
/// instead of files on disk.
pub struct SourceWatcher<S> {
    source: S,
    check_interval: Duration,
    last_version: Option<String>,
}

impl<S: super::source::CatalogSource + 'static> SourceWatcher<S> {
    pub fn new(source: S, check_interval: Duration) -> Self {
        SourceWatcher {
            source,
            check_interval,
            last_version: None,
        }
    }

    /// Load the initial snapshot and start the polling task.
    pub async fn start(
        mut self,
    ) -> (
        watch::Receiver<Arc<CatalogSnapshot>>,
        tokio::task::JoinHandle<()>,
    ) {
        let initial = match self.source.load_snapshot().await {
            Ok(snapshot) => {
                self.last_version = Some(snapshot.version.clone());
                info!(
                    version = %snapshot.version,
                    cards = snapshot.card_count(),
                    "Loaded initial catalog from upstream source"
                );
                Arc::new(snapshot)
            }
            Err(e) => {
                error!("Failed to load initial catalog from source: {}", e);
                Arc::new(CatalogSnapshot::empty())
            }
        };

        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut interval = interval(self.check_interval);

            loop {
                interval.tick().await;

                let version = match self.source.fetch_version().await {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("Error checking catalog version: {}", e);
                        continue;
                    }
                };

                if self.last_version.as_ref() == Some(&version) {
                    continue;
                }

                match self.source.load_snapshot().await {
                    Ok(snapshot) => {
                        info!(
                            "Catalog version changed: {:?} -> {}",
                            self.last_version, snapshot.version
                        );
                        self.last_version = Some(snapshot.version.clone());
                        let _ = tx.send(Arc::new(snapshot));
                    }
                    Err(e) => warn!("Error reloading catalog from source: {}", e),
                }
            }
        });

        (rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG_V1: &str = r#"
catalog_version: "v1"
cards:
  - { id: c1, name: "Card One", bank: "Bank", base_percentage: "1" }
rules:
  - { id: r1, card_id: c1, match_type: base, percentage: "2" }
"#;

    const CATALOG_V2: &str = r#"
catalog_version: "v2"
cards:
  - { id: c1, name: "Card One", bank: "Bank", base_percentage: "1" }
  - { id: c2, name: "Card Two", bank: "Bank", base_percentage: "0.4" }
rules:
  - { id: r1, card_id: c1, match_type: base, percentage: "2" }
"#;

    fn create_test_files() -> (NamedTempFile, NamedTempFile) {
        let mut catalog_file = NamedTempFile::new().unwrap();
        write!(catalog_file, "{}", CATALOG_V1).unwrap();

        let mut merchants_file = NamedTempFile::new().unwrap();
        writeln!(merchants_file, "dining: [mcdonald]").unwrap();

        (catalog_file, merchants_file)
    }

    #[tokio::test]
    async fn test_watcher_initial_load() {
        let (catalog_file, merchants_file) = create_test_files();

        let loader = CatalogLoader::new(
            catalog_file.path().to_string_lossy(),
            merchants_file.path().to_string_lossy(),
        );

        let watcher = CatalogWatcher::new(loader, Duration::from_secs(60));
        let (rx, handle) = watcher.start();

        let snapshot = rx.borrow();
        assert_eq!(snapshot.version, "v1");
        assert_eq!(snapshot.card_count(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_watcher_detects_changes() {
        let (catalog_file, merchants_file) = create_test_files();
        let catalog_path = catalog_file.path().to_path_buf();

        let loader = CatalogLoader::new(
            catalog_file.path().to_string_lossy(),
            merchants_file.path().to_string_lossy(),
        );

        let watcher = CatalogWatcher::new(loader, Duration::from_millis(50));
        let (mut rx, handle) = watcher.start();

        assert_eq!(rx.borrow().version, "v1");

        tokio::time::sleep(Duration::from_millis(10)).await;
        std::fs::write(&catalog_path, CATALOG_V2).unwrap();

        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("Timeout waiting for catalog change")
            .unwrap();

        assert_eq!(rx.borrow().version, "v2");
        assert_eq!(rx.borrow().card_count(), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_source_watcher_picks_up_new_version() {
        use crate::catalog::memory::MemoryCatalog;
        use crate::domain::Card;
        use rust_decimal::Decimal;

        let source = MemoryCatalog::new();
        source.add_card(Card::new("c1", "Card One", "Bank", Decimal::new(1, 0)));

        let watcher = SourceWatcher::new(source, Duration::from_secs(60));
        let (rx, handle) = watcher.start().await;

        assert_eq!(rx.borrow().version, "memory-v1");
        assert_eq!(rx.borrow().card_count(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_watcher_survives_missing_file() {
        let loader = CatalogLoader::new("/nonexistent/catalog.yaml", "/nonexistent/merchants.yaml");
        let watcher = CatalogWatcher::new(loader, Duration::from_secs(60));
        let (rx, handle) = watcher.start();

        // Falls back to an empty snapshot rather than panicking
        assert_eq!(rx.borrow().version, "0.0.0");
        assert_eq!(rx.borrow().card_count(), 0);

        handle.abort();
    }
}
