//! Per-stage frame snapshots. Written atomically (temp file + rename) so a
//! crash mid-write never leaves a corrupt checkpoint; failures here are
//! logged and otherwise ignored; they must never abort the run.

use std::path::{Path, PathBuf};

use jobtable_schema::JobRow;

pub struct CheckpointWriter {
    dir: PathBuf,
}

impl CheckpointWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn write(&self, run_id: &str, stage: &str, rows: &[JobRow]) {
        if let Err(e) = self.try_write(run_id, stage, rows).await {
            tracing::warn!(run_id, stage, error = %e, "checkpoint write failed, continuing");
        }
    }

    async fn try_write(&self, run_id: &str, stage: &str, rows: &[JobRow]) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let final_path = self.path_for(run_id, stage);
        let tmp_path = final_path.with_extension("tmp");
        let body = serde_json::to_vec(rows)?;
        tokio::fs::write(&tmp_path, body).await?;
        tokio::fs::rename(&tmp_path, &final_path).await?;
        Ok(())
    }

    fn path_for(&self, run_id: &str, stage: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.json", run_id, stage))
    }

    pub fn checkpoint_path(&self, run_id: &str, stage: &str) -> PathBuf {
        self.path_for(run_id, stage)
    }
}

pub fn stage_exists(dir: &Path, run_id: &str, stage: &str) -> bool {
    dir.join(format!("{}_{}.json", run_id, stage)).exists()
}
