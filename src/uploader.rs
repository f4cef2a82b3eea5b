use log::{error, info};
use serde_json::{json, Map, Value};

/// Minimal surface the uploader needs from the cloud backend. Lets the
/// upload logic run against a fake store in tests.
pub trait CloudStore {
    /// Current session token validity, rechecked before every upload.
    fn ready(&self) -> bool;

    /// Writes `record` at `path`, overwriting any existing value there.
    fn write_record(&mut self, path: &str, record: &Value) -> anyhow::Result<()>;
}

/// One reading, built fresh per upload and never persisted locally.
/// `percentage`/`average_percentage` are only carried by continuous
/// builds; single-shot uploads just the raw value and the timestamp.
pub struct UploadRecord {
    pub moisture: u16,
    pub timestamp: i64,
    pub percentage: Option<i32>,
    pub average_percentage: Option<i32>,
}

impl UploadRecord {
    pub fn new(moisture: u16, timestamp: i64) -> Self {
        Self {
            moisture,
            timestamp,
            percentage: None,
            average_percentage: None,
        }
    }

    pub fn with_percentages(mut self, percentage: i32, average_percentage: i32) -> Self {
        self.percentage = Some(percentage);
        self.average_percentage = Some(average_percentage);
        self
    }

    /// Remote key: collisions only happen when two uploads share the
    /// same integer-second timestamp, and the later write wins.
    pub fn path(&self, device_name: &str) -> String {
        format!("{}/{}", device_name, self.timestamp)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("moisture".to_string(), json!(self.moisture));
        map.insert("timestamp".to_string(), json!(self.timestamp));
        if let Some(pct) = self.percentage {
            map.insert("moisture_pct".to_string(), json!(pct));
        }
        if let Some(avg) = self.average_percentage {
            map.insert("moisture_avg_pct".to_string(), json!(avg));
        }
        Value::Object(map)
    }
}

/// Fire-and-forget upload: skipped entirely while the session is not
/// ready, failures are logged and dropped. No retry, no local queue.
pub fn log_moisture<C: CloudStore>(store: &mut C, device_name: &str, record: &UploadRecord) {
    if !store.ready() {
        info!("Cloud session is not ready");
        return;
    }

    let body = record.to_json();
    info!("{body}");

    if let Err(e) = store.write_record(&record.path(device_name), &body) {
        error!("Logging failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeStore {
        ready: bool,
        writes: Vec<(String, Value)>,
        fail: bool,
    }

    impl FakeStore {
        fn new(ready: bool) -> Self {
            Self {
                ready,
                writes: Vec::new(),
                fail: false,
            }
        }
    }

    impl CloudStore for FakeStore {
        fn ready(&self) -> bool {
            self.ready
        }

        fn write_record(&mut self, path: &str, record: &Value) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("PERMISSION_DENIED");
            }
            self.writes.push((path.to_string(), record.clone()));
            Ok(())
        }
    }

    #[test]
    fn path_is_device_name_slash_timestamp() {
        let record = UploadRecord::new(1800, 1700000000);
        assert_eq!(record.path("plant1"), "plant1/1700000000");
    }

    #[test]
    fn zero_timestamp_still_produces_a_path() {
        // Clock-sync failure keys the record at <device>/0.
        let record = UploadRecord::new(1800, 0);
        assert_eq!(record.path("plant1"), "plant1/0");
    }

    #[test]
    fn single_shot_body_has_only_moisture_and_timestamp() {
        let record = UploadRecord::new(1800, 1700000000);
        assert_eq!(
            record.to_json(),
            json!({"moisture": 1800, "timestamp": 1700000000})
        );
    }

    #[test]
    fn continuous_body_carries_both_percentages() {
        let record = UploadRecord::new(1755, 1700000000).with_percentages(50, 47);
        assert_eq!(
            record.to_json(),
            json!({
                "moisture": 1755,
                "timestamp": 1700000000,
                "moisture_pct": 50,
                "moisture_avg_pct": 47
            })
        );
    }

    #[test]
    fn uploads_are_skipped_while_not_ready() {
        let mut store = FakeStore::new(false);
        for i in 0..10 {
            let record = UploadRecord::new(1800, 1700000000 + i);
            log_moisture(&mut store, "plant1", &record);
        }
        assert!(store.writes.is_empty());
    }

    #[test]
    fn ready_store_receives_the_record() {
        let mut store = FakeStore::new(true);
        let record = UploadRecord::new(1800, 1700000000);
        log_moisture(&mut store, "plant1", &record);

        assert_eq!(store.writes.len(), 1);
        let (path, body) = &store.writes[0];
        assert_eq!(path, "plant1/1700000000");
        assert_eq!(body["moisture"], 1800);
        assert_eq!(body["timestamp"], 1700000000);
    }

    #[test]
    fn write_failure_is_dropped_without_retry() {
        let mut store = FakeStore::new(true);
        store.fail = true;
        let record = UploadRecord::new(1800, 1700000000);
        log_moisture(&mut store, "plant1", &record);
        assert!(store.writes.is_empty());
    }
}
