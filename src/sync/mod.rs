//! Mirroring between a local directory of workflow files and the remote service.
//!
//! Each exported workflow lands in a file named after the workflow.
//! Bulk operations are best-effort: items are processed one at a time
//! and a failed item is logged and counted without stopping the batch.

pub mod filename;
mod schema;

use std::{
    fs,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, trace, warn};

use crate::{FlowsyncError, Result, WorkflowApi, model::Workflow};

/// Counts of a `pull_all` run, `exported + failed == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullSummary {
    pub exported: usize,
    pub failed: usize,
    pub total: usize,
}

/// Counts of a `push_all` run, `imported + failed == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSummary {
    pub imported: usize,
    pub failed: usize,
    pub total: usize,
}

pub struct Synchronizer {
    api: Arc<dyn WorkflowApi>,
    dir: PathBuf,
    matcher: GlobMatcher,
}

impl Synchronizer {
    /// Creates the sync directory when it does not exist yet.
    pub fn new<P: Into<PathBuf>>(
        api: Arc<dyn WorkflowApi>,
        dir: P,
        pattern: &str,
    ) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| FlowsyncError::LocalIo(format!("failed to create {}: {}", dir.display(), err)))?;
        let matcher = Glob::new(pattern)?.compile_matcher();

        Ok(Self {
            api,
            dir,
            matcher,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one remote workflow to disk and returns the written path.
    ///
    /// Without an explicit `filename` the name is derived from the
    /// workflow name, so two workflows that sanitize alike overwrite
    /// each other.
    pub fn export_one(
        &self,
        id: &str,
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        trace!("sync::export_one({})", id);
        let workflow = self.api.get_workflow(id)?;

        let filename = match filename {
            Some(filename) => filename::with_extension(filename),
            None => filename::for_workflow(workflow.name.as_deref(), id),
        };
        let path = self.local_path(&filename)?;

        let text = serde_json::to_string_pretty(&workflow).map_err(|err| FlowsyncError::Invalid(err.to_string()))?;
        fs::write(&path, text).map_err(|err| FlowsyncError::LocalIo(format!("failed to write {}: {}", path.display(), err)))?;

        info!("exported workflow {} to {}", id, path.display());
        Ok(path)
    }

    /// Pushes one local file and returns the remote id it ended up under.
    ///
    /// A document whose id exists remotely is updated in place, one
    /// without an id or with an id the service does not know is created.
    pub fn import_one(
        &self,
        filename: &str,
    ) -> Result<String> {
        trace!("sync::import_one({})", filename);
        let workflow = self.read_workflow(filename)?;

        if let Some(id) = workflow.id() {
            match self.api.get_workflow(id) {
                Ok(_) => {
                    self.api.update_workflow(id, &workflow)?;
                    info!("updated existing workflow {} from {}", id, filename);
                    return Ok(id.to_string());
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }

        let created = self.api.create_workflow(&workflow)?;
        let id = created.id().ok_or_else(|| FlowsyncError::Decode("created workflow carries no id".to_string()))?.to_string();
        info!("created new workflow {} from {}", id, filename);
        Ok(id)
    }

    /// Exports every remote workflow, an entry without id counts as failed.
    pub fn pull_all(&self) -> Result<PullSummary> {
        let workflows = self.api.list_workflows(false)?;
        let mut summary = PullSummary {
            total: workflows.len(),
            ..PullSummary::default()
        };

        for workflow in &workflows {
            let Some(id) = workflow.id() else {
                warn!("skipping workflow '{}' without id", workflow.display_name());
                summary.failed += 1;
                continue;
            };
            match self.export_one(id, None) {
                Ok(_) => summary.exported += 1,
                Err(err) => {
                    warn!("error exporting workflow {}: {}", id, err);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Imports every matching file of the sync directory, in name order.
    pub fn push_all(&self) -> Result<PushSummary> {
        let files = self.local_files()?;
        let mut summary = PushSummary {
            total: files.len(),
            ..PushSummary::default()
        };

        for filename in &files {
            match self.import_one(filename) {
                Ok(_) => summary.imported += 1,
                Err(err) => {
                    warn!("error importing {}: {}", filename, err);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Names of the regular files matching the pattern, sorted.
    pub fn local_files(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|err| FlowsyncError::LocalIo(format!("failed to read {}: {}", self.dir.display(), err)))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if self.matcher.is_match(&name) {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Joins a bare file name to the sync directory, anything else is rejected.
    fn local_path(
        &self,
        filename: &str,
    ) -> Result<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(filename)),
            _ => Err(FlowsyncError::Invalid(format!("filename must name a file inside the sync directory: {}", filename))),
        }
    }

    fn read_workflow(
        &self,
        filename: &str,
    ) -> Result<Workflow> {
        let path = self.local_path(filename)?;
        let text = fs::read_to_string(&path).map_err(|err| FlowsyncError::LocalIo(format!("failed to read {}: {}", path.display(), err)))?;
        let document: JsonValue =
            serde_json::from_str(&text).map_err(|err| FlowsyncError::LocalIo(format!("invalid JSON in {}: {}", path.display(), err)))?;
        schema::validate(&document)?;
        Workflow::from_value(document).map_err(|err| FlowsyncError::Invalid(format!("{}: {}", path.display(), err)))
    }
}
