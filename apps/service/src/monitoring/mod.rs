//! Background monitoring pipeline.
//!
//! This module owns the real scheduling, failure-handling, and
//! state-transition logic:
//! - Normalizing raw check records before they are probed
//! - Executing HTTP/HTTPS probes with a bounded timeout
//! - Deriving up/down transitions and alerting on changes
//! - Driving the periodic probe and log-rotation cycles
pub mod probe;
pub mod processor;
pub mod scheduler;
pub mod types;
pub mod validate;

pub use probe::ProbeExecutor;
pub use scheduler::{Scheduler, SchedulerConfig};
pub use types::{Check, CheckOutcome, CheckState};

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory collaborator fakes shared by the monitoring tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::alerts::AlertGateway;
    use crate::error::{AlertError, StoreError};
    use crate::store::RecordStore;
    use crate::store::logs::LogStore;

    #[derive(Default)]
    pub struct MemoryRecordStore {
        pub records: Mutex<HashMap<String, Value>>,
    }

    fn record_key(collection: &str, key: &str) -> String {
        format!("{collection}/{key}")
    }

    #[async_trait]
    impl RecordStore for MemoryRecordStore {
        async fn create(&self, collection: &str, key: &str, record: &Value) -> Result<(), StoreError> {
            let mut records = self.records.lock().unwrap();
            let full_key = record_key(collection, key);
            if records.contains_key(&full_key) {
                return Err(StoreError::AlreadyExists);
            }
            records.insert(full_key, record.clone());
            Ok(())
        }

        async fn read(&self, collection: &str, key: &str) -> Result<Value, StoreError> {
            self.records
                .lock()
                .unwrap()
                .get(&record_key(collection, key))
                .cloned()
                .ok_or(StoreError::NotFound)
        }

        async fn update(&self, collection: &str, key: &str, record: &Value) -> Result<(), StoreError> {
            let mut records = self.records.lock().unwrap();
            let full_key = record_key(collection, key);
            if !records.contains_key(&full_key) {
                return Err(StoreError::NotFound);
            }
            records.insert(full_key, record.clone());
            Ok(())
        }

        async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
            self.records
                .lock()
                .unwrap()
                .remove(&record_key(collection, key))
                .map(|_| ())
                .ok_or(StoreError::NotFound)
        }

        async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
            let prefix = format!("{collection}/");
            Ok(self
                .records
                .lock()
                .unwrap()
                .keys()
                .filter_map(|key| key.strip_prefix(&prefix))
                .map(str::to_string)
                .collect())
        }
    }

    #[derive(Default)]
    pub struct MemoryLogStore {
        pub lines: Mutex<HashMap<String, String>>,
        pub archives: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl LogStore for MemoryLogStore {
        async fn append(&self, id: &str, line: &str) -> Result<(), StoreError> {
            let mut lines = self.lines.lock().unwrap();
            lines.entry(id.to_string()).or_default().push_str(&format!("{line}\n"));
            Ok(())
        }

        async fn list(&self, include_archived: bool) -> Result<Vec<String>, StoreError> {
            let mut ids: Vec<String> = self.lines.lock().unwrap().keys().cloned().collect();
            if include_archived {
                ids.extend(self.archives.lock().unwrap().keys().cloned());
            }
            Ok(ids)
        }

        async fn read(&self, id: &str) -> Result<String, StoreError> {
            self.lines.lock().unwrap().get(id).cloned().ok_or(StoreError::NotFound)
        }

        async fn compress(&self, id: &str, archive_id: &str) -> Result<(), StoreError> {
            let content = self.lines.lock().unwrap().get(id).cloned().ok_or(StoreError::NotFound)?;
            self.archives.lock().unwrap().insert(archive_id.to_string(), content);
            Ok(())
        }

        async fn truncate(&self, id: &str) -> Result<(), StoreError> {
            let mut lines = self.lines.lock().unwrap();
            let entry = lines.get_mut(id).ok_or(StoreError::NotFound)?;
            entry.clear();
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingGateway {
        pub sent: Mutex<Vec<(String, String)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl AlertGateway for RecordingGateway {
        async fn send(&self, recipient: &str, message: &str) -> Result<(), AlertError> {
            if self.fail {
                return Err(AlertError::Rejected(500));
            }
            self.sent.lock().unwrap().push((recipient.to_string(), message.to_string()));
            Ok(())
        }
    }
}
