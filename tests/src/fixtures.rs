//! Test fixtures.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use worker::{FileRegistry, PipelineConfig, SupervisorConfig};

/// Path of a recording in a directory that does not exist on disk.
pub fn cam_path(name: &str) -> PathBuf {
    PathBuf::from("/cam-test").join(name)
}

/// Recording name for a given day, e.g. `2021-11-20_14h00m00s.mp4`.
pub fn recording_name(date: &str, time: &str) -> String {
    format!("{}_{}.mp4", date, time)
}

/// Registry with the given files created and closed, in order.
pub fn closed_registry(names: &[&str]) -> Arc<FileRegistry> {
    let registry = Arc::new(FileRegistry::new());
    for name in names {
        let path = cam_path(name);
        registry.insert(&path);
        registry.mark_closed(&path);
    }
    registry
}

/// Writes a small fake recording and closes it.
pub fn write_recording(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\x00\x00\x00\x18ftypmp42").expect("write recording");
    path
}

/// Pipeline settings with short real-time intervals for end-to-end tests.
pub fn fast_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        supervisor: SupervisorConfig {
            poll_interval_ms: 50,
            backoff_initial_ms: 10,
            backoff_max_ms: 100,
        },
        ..Default::default()
    }
}
