#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use protoroute::descriptor::{load_bundle, DescriptorBundle};
use std::path::PathBuf;

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The widgets bundle shared by the integration tests
pub fn widgets_bundle() -> DescriptorBundle {
    load_bundle(&fixture_path("widgets.yaml")).expect("load widgets fixture")
}

pub mod temp_files {
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write `content` into a fresh temporary directory as `file_name`.
    ///
    /// The directory lives as long as the returned guard.
    pub fn write_temp(file_name: &str, content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(file_name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    /// Copy a fixture into a fresh temporary directory
    pub fn copy_fixture(name: &str) -> (TempDir, PathBuf) {
        let content = std::fs::read_to_string(super::fixture_path(name)).unwrap();
        write_temp(name, &content)
    }
}
