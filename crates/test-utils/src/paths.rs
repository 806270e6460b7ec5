//! Path utilities for test data and test output.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the path to `services/{service_name}/testdata/`.
pub fn service_testdata_dir(service_name: &str) -> PathBuf {
    workspace_root()
        .join("services")
        .join(service_name)
        .join("testdata")
}

/// Creates a temporary directory with a specific prefix.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(root.join("Cargo.toml").exists(), "workspace root: {:?}", root);
    }

    #[test]
    fn test_temp_dir_prefix() {
        let dir = temp_test_dir_with_prefix("render_test");
        let name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("render_test"));
        assert!(dir.path().exists());
    }
}
