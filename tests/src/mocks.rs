//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use storage::{ObjectStore, StoreConnector};
use tokio::time::Instant;
use uploader_core::StorageError;

/// In-memory object store with scripted upload failures.
///
/// Each `put` pops the next scripted result; once the script is empty every
/// upload succeeds. Call times use the tokio clock so paused-time tests can
/// measure backoff delays.
#[derive(Default)]
pub struct MockStore {
    script: Mutex<VecDeque<StorageError>>,
    put_calls: Mutex<Vec<(String, Instant)>>,
    objects: Mutex<Vec<String>>,
    refuse_delete: Mutex<HashSet<String>>,
    list_error: Mutex<Option<StorageError>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with remote objects.
    pub fn with_objects(names: &[&str]) -> Self {
        let store = Self::new();
        store
            .objects
            .lock()
            .extend(names.iter().map(|n| n.to_string()));
        store
    }

    /// Makes the next uploads fail with these errors, in order.
    pub fn fail_next_puts(&self, errors: impl IntoIterator<Item = StorageError>) {
        self.script.lock().extend(errors);
    }

    /// Makes deleting `name` fail.
    pub fn refuse_delete(&self, name: &str) {
        self.refuse_delete.lock().insert(name.to_string());
    }

    /// Makes listing fail.
    pub fn fail_list(&self, error: StorageError) {
        *self.list_error.lock() = Some(error);
    }

    /// Names of all `put` calls with their call time.
    pub fn put_calls(&self) -> Vec<(String, Instant)> {
        self.put_calls.lock().clone()
    }

    pub fn put_count(&self) -> usize {
        self.put_calls.lock().len()
    }

    /// Current remote object names.
    pub fn objects(&self) -> Vec<String> {
        self.objects.lock().clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.lock().iter().any(|o| o == name)
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn put(&self, local_path: &Path) -> Result<String, StorageError> {
        let name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .ok_or_else(|| StorageError::local_file("path has no file name"))?;

        self.put_calls.lock().push((name.clone(), Instant::now()));

        if let Some(error) = self.script.lock().pop_front() {
            return Err(error);
        }

        self.objects.lock().push(name.clone());
        Ok(name)
    }

    async fn delete(&self, remote_name: &str) -> Result<(), StorageError> {
        if self.refuse_delete.lock().contains(remote_name) {
            return Err(StorageError::permanent(format!("403 deleting {}", remote_name)));
        }
        let mut objects = self.objects.lock();
        match objects.iter().position(|o| o == remote_name) {
            Some(index) => {
                objects.remove(index);
                Ok(())
            }
            None => Err(StorageError::permanent(format!("404 {}", remote_name))),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        if let Some(error) = self.list_error.lock().clone() {
            return Err(error);
        }
        Ok(self.objects.lock().clone())
    }
}

/// Connector handing out a shared [`MockStore`], optionally failing the
/// first few connects.
pub struct MockConnector {
    store: Arc<MockStore>,
    failures_left: Mutex<u32>,
    connects: Mutex<Vec<Instant>>,
}

impl MockConnector {
    pub fn new(store: Arc<MockStore>) -> Self {
        Self {
            store,
            failures_left: Mutex::new(0),
            connects: Mutex::new(Vec::new()),
        }
    }

    /// Makes the next `n` connects fail as unavailable.
    pub fn fail_next_connects(&self, n: u32) {
        *self.failures_left.lock() = n;
    }

    /// Time of every connect call, failed ones included.
    pub fn connect_calls(&self) -> Vec<Instant> {
        self.connects.lock().clone()
    }

    pub fn store(&self) -> Arc<MockStore> {
        self.store.clone()
    }
}

#[async_trait]
impl StoreConnector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn ObjectStore>, StorageError> {
        self.connects.lock().push(Instant::now());

        let mut failures_left = self.failures_left.lock();
        if *failures_left > 0 {
            *failures_left -= 1;
            return Err(StorageError::unavailable("mock storage offline"));
        }

        Ok(self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_script() {
        let store = MockStore::new();
        store.fail_next_puts([StorageError::transient("timeout")]);

        let path = Path::new("/cam-test/a.mp4");
        assert!(store.put(path).await.is_err());
        assert_eq!(store.put(path).await.unwrap(), "a.mp4");
        assert_eq!(store.put_count(), 2);
        assert_eq!(store.objects(), vec!["a.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_connector_failures() {
        let connector = MockConnector::new(Arc::new(MockStore::new()));
        connector.fail_next_connects(1);

        assert!(connector.connect().await.is_err());
        assert!(connector.connect().await.is_ok());
        assert_eq!(connector.connect_calls().len(), 2);
    }
}
