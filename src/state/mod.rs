use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::profile::{self, ProfiledMessage};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The loaded record set: insertion order is input order. Created once per
/// successful load and replaced wholesale on reload; records are never
/// mutated element-wise.
#[derive(Debug)]
pub struct ProfileStore {
    profiles: Vec<ProfiledMessage>,
}

impl ProfileStore {
    #[cfg(test)]
    pub fn from_profiles(profiles: Vec<ProfiledMessage>) -> Self {
        Self { profiles }
    }

    /// Read and normalize the dataset at `path`. This is the pipeline's one
    /// retrieval point; there is no retry and no timeout.
    pub async fn load(path: &Path) -> Result<Self, LoadError> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let profiles = profile::parse_profiles(&raw).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), records = profiles.len(), "dataset loaded");

        Ok(Self { profiles })
    }

    pub fn profiles(&self) -> &[ProfiledMessage] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Swap in a freshly loaded record set. The previous set is dropped as a
    /// whole; there is no partial merge.
    pub fn replace(&mut self, next: Self) {
        self.profiles = next.profiles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("statescope-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn load_reads_and_normalizes_the_dataset() {
        let path = scratch_path("load");
        std::fs::write(
            &path,
            r#"[ { "message": { "tags": ["x"] }, "states": [ { "name": "A" } ] } ]"#,
        )
        .expect("scratch file should write");

        let store = ProfileStore::load(&path).await.expect("load should succeed");
        assert_eq!(store.len(), 1);
        assert_eq!(store.profiles()[0].message.tags, vec!["x"]);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn load_surfaces_missing_file_as_read_error() {
        let path = scratch_path("missing");
        let err = ProfileStore::load(&path)
            .await
            .expect_err("missing file should fail");
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[tokio::test]
    async fn load_surfaces_malformed_payload_as_parse_error() {
        let path = scratch_path("malformed");
        std::fs::write(&path, r#"[ { "states": [] } ]"#).expect("scratch file should write");

        let err = ProfileStore::load(&path)
            .await
            .expect_err("row without a message should fail");
        assert!(matches!(err, LoadError::Parse { .. }));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_record_set() {
        let path = scratch_path("replace-a");
        std::fs::write(
            &path,
            r#"[ { "message": { "tags": ["old"] }, "states": [] } ]"#,
        )
        .expect("scratch file should write");
        let mut store = ProfileStore::load(&path).await.expect("load should succeed");

        let next_path = scratch_path("replace-b");
        std::fs::write(
            &next_path,
            r#"[
                { "message": { "tags": ["new"] }, "states": [] },
                { "message": { "tags": ["new"] }, "states": [] }
            ]"#,
        )
        .expect("scratch file should write");
        let next = ProfileStore::load(&next_path)
            .await
            .expect("load should succeed");

        store.replace(next);
        assert_eq!(store.len(), 2);
        assert!(
            store
                .profiles()
                .iter()
                .all(|profile| profile.message.tags == vec!["new"])
        );

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(&next_path);
    }
}
