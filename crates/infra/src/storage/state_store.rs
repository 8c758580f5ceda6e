//! JSON-file persistence for per-user reconciliation state.

use std::path::PathBuf;

use async_trait::async_trait;
use recap_core::StateStore;
use recap_domain::{RecapError, Result, UserSyncState};
use tracing::{instrument, warn};

/// One `{user_id}.json` document per user under a state directory.
///
/// Saves write to a sibling temp file and rename it into place, so a crash
/// mid-write never leaves a truncated document behind.
pub struct JsonStateStore {
    dir: PathBuf,
}

impl JsonStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{user_id}.json"))
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    #[instrument(skip(self))]
    async fn load(&self, user_id: &str) -> Result<UserSyncState> {
        let path = self.path_for(user_id);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UserSyncState::default());
            }
            Err(e) => {
                return Err(RecapError::Storage(format!(
                    "reading {}: {e}",
                    path.display()
                )));
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(error) => {
                // A corrupt document means a fresh start for this user, not a
                // stuck reconciliation loop.
                warn!(user_id, %error, path = %path.display(), "corrupt state document, starting empty");
                Ok(UserSyncState::default())
            }
        }
    }

    #[instrument(skip(self, state))]
    async fn save(&self, user_id: &str, state: &UserSyncState) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RecapError::Storage(format!("creating state dir: {e}")))?;

        let encoded = serde_json::to_vec_pretty(state)
            .map_err(|e| RecapError::Internal(format!("encoding state: {e}")))?;

        let path = self.path_for(user_id);
        let tmp = self.dir.join(format!("{user_id}.json.tmp"));

        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|e| RecapError::Storage(format!("writing {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RecapError::Storage(format!("replacing {}: {e}", path.display())))
    }
}
