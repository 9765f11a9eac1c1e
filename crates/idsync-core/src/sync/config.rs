//! IDM config entity export and import.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use super::FileExport;
use crate::batch::{settle_all, BatchResult};
use crate::bundle::{BundleContext, ExportBundle};
use crate::error::{SyncError, SyncResult};
use crate::files::{self, ExportKind};
use crate::pager;
use crate::remote::ConfigRemote;
use crate::transform::env::EnvironmentMap;
use crate::validation::{first_invalid_hook, JavaScriptChecker, SyntaxChecker};

const JSON_SUFFIX: &str = ".json";

/// Config entity ids covered by a parameterized export or import.
///
/// Read from a JSON file of the form `{"idm": ["managed", "sync"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySelection {
    #[serde(default)]
    pub idm: Vec<String>,
}

impl EntitySelection {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            idm: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn load(path: &Path) -> SyncResult<Self> {
        files::read_json(path)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.idm.iter().any(|s| s == id)
    }
}

/// Export and import of IDM configuration.
pub struct ConfigSync<R> {
    remote: Arc<R>,
    context: BundleContext,
    checker: Arc<dyn SyntaxChecker>,
}

impl<R: ConfigRemote> ConfigSync<R> {
    pub fn new(remote: Arc<R>, context: BundleContext) -> Self {
        Self {
            remote,
            context,
            checker: Arc::new(JavaScriptChecker),
        }
    }

    /// Use a different script hook checker.
    pub fn with_checker(mut self, checker: Arc<dyn SyntaxChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Ids of every config entity.
    pub async fn list_config_entities(&self) -> SyncResult<Vec<String>> {
        self.remote.list_config_entities().await
    }

    /// Export one entity as raw JSON to `file`, or `<id>.idm.json`.
    pub async fn export_config_entity(&self, id: &str, file: Option<&Path>) -> SyncResult<PathBuf> {
        let path = file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(files::typed_filename(id, ExportKind::Idm)));
        let entity = self.remote.get_config_entity(id).await?;
        files::write_json(&path, &entity)?;
        info!(id, path = %path.display(), "exported config entity");
        Ok(path)
    }

    /// Export every entity to `<dir>/<id>.json`.
    pub async fn export_all_raw(&self, dir: &Path) -> SyncResult<BatchResult> {
        let ids = self.remote.list_config_entities().await?;
        Ok(self.export_to_dir("export config entities", ids, dir, None).await)
    }

    /// Export the selected entities to `<dir>/<id>.json`, replacing every
    /// literal value in `env` with its `${key}` placeholder.
    pub async fn export_selected(
        &self,
        dir: &Path,
        selection: &EntitySelection,
        env: &EnvironmentMap,
    ) -> SyncResult<BatchResult> {
        let ids: Vec<String> = self
            .remote
            .list_config_entities()
            .await?
            .into_iter()
            .filter(|id| selection.contains(id))
            .collect();
        Ok(self
            .export_to_dir("export selected config entities", ids, dir, Some(env))
            .await)
    }

    async fn export_to_dir(
        &self,
        operation: &str,
        ids: Vec<String>,
        dir: &Path,
        env: Option<&EnvironmentMap>,
    ) -> BatchResult {
        let batch = settle_all(operation, ids, |id| async move {
            let entity = self.remote.get_config_entity(&id).await?;
            let text = files::to_pretty_json(&entity, &id)?;
            let text = match env {
                Some(env) => env.substitute(&text),
                None => text,
            };
            files::write_text(&files::entity_path(dir, &id), &text)
        })
        .await;
        batch.log_summary();
        batch
    }

    /// Export every entity into one bundle.
    pub async fn export_all_to_file(&self, file: Option<&Path>) -> SyncResult<FileExport> {
        let start = Instant::now();
        let path = file.map(Path::to_path_buf).unwrap_or_else(|| {
            PathBuf::from(files::bulk_filename(
                &self.context.realm,
                "ConfigEntities",
                ExportKind::Idm,
            ))
        });

        let ids = self.remote.list_config_entities().await?;
        let fetched = join_all(ids.iter().map(|id| self.remote.get_config_entity(id))).await;

        let mut bundle: ExportBundle = self.context.bundle();
        let mut batch = BatchResult::new("export config entities to file", ids.len());
        for (index, (id, result)) in ids.into_iter().zip(fetched).enumerate() {
            match result {
                Ok(entity) => {
                    bundle.idm.insert(id.clone(), entity);
                    batch.record(index, id, Ok(()));
                }
                Err(e) => batch.record(index, id, Err(e)),
            }
        }
        bundle.write(&path)?;
        batch.set_duration(start.elapsed().as_millis() as u64);
        batch.log_summary();
        Ok(FileExport { path, batch })
    }

    /// Import one entity from `file`, or `<id>.idm.json`.
    pub async fn import_config_entity(
        &self,
        id: &str,
        file: Option<&Path>,
        validate: bool,
    ) -> SyncResult<()> {
        let path = file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(files::typed_filename(id, ExportKind::Idm)));
        let payload: Value = files::read_json(&path)?;
        let label = path.display().to_string();
        self.gate([(label.as_str(), &payload)], validate)?;
        self.remote.put_config_entity(id, &payload).await?;
        info!(id, "imported config entity");
        Ok(())
    }

    /// Import every `*.json` file under `dir`; the id is the file's path
    /// relative to `dir` without the extension.
    pub async fn import_all_raw(&self, dir: &Path, validate: bool) -> SyncResult<BatchResult> {
        self.import_from_dir("import config entities", dir, None, None, validate)
            .await
    }

    /// Import the selected entities from `dir`, turning `${key}` placeholders
    /// back into the values in `env`.
    pub async fn import_selected(
        &self,
        dir: &Path,
        selection: &EntitySelection,
        env: &EnvironmentMap,
        validate: bool,
    ) -> SyncResult<BatchResult> {
        self.import_from_dir(
            "import selected config entities",
            dir,
            Some(selection),
            Some(env),
            validate,
        )
        .await
    }

    async fn import_from_dir(
        &self,
        operation: &str,
        dir: &Path,
        selection: Option<&EntitySelection>,
        env: Option<&EnvironmentMap>,
        validate: bool,
    ) -> SyncResult<BatchResult> {
        let mut ids = Vec::new();
        let mut labels = Vec::new();
        let mut payloads = HashMap::new();
        for file in files::collect_files(dir, JSON_SUFFIX, true)? {
            let id = file.stem(JSON_SUFFIX).to_string();
            if selection.is_some_and(|s| !s.contains(&id)) {
                continue;
            }
            let text = files::read_text(&file.path)?;
            let text = match env {
                Some(env) => env.unsubstitute(&text),
                None => text,
            };
            let payload: Value = serde_json::from_str(&text)
                .map_err(|e| SyncError::json(file.relative.clone(), e))?;
            ids.push(id.clone());
            labels.push(file.relative);
            payloads.insert(id, payload);
        }

        self.gate(
            labels
                .iter()
                .zip(&ids)
                .filter_map(|(label, id)| payloads.get(id).map(|p| (label.as_str(), p))),
            validate,
        )?;

        let payloads = &payloads;
        let batch = settle_all(operation, ids, |id| async move {
            let payload = payloads
                .get(&id)
                .ok_or_else(|| SyncError::not_found(id.clone()))?;
            self.remote.put_config_entity(&id, payload).await
        })
        .await;
        batch.log_summary();
        Ok(batch)
    }

    /// Import every entity in a bundle file.
    pub async fn import_all_from_file(&self, file: &Path, validate: bool) -> SyncResult<BatchResult> {
        let bundle: ExportBundle = ExportBundle::read(file)?;
        self.gate(bundle.idm.iter().map(|(id, p)| (id.as_str(), p)), validate)?;

        let idm = &bundle.idm;
        let batch = settle_all(
            "import config entities from file",
            idm.keys().cloned(),
            |id| async move {
                let payload = idm.get(&id).ok_or_else(|| SyncError::not_found(id.clone()))?;
                self.remote.put_config_entity(&id, payload).await
            },
        )
        .await;
        batch.log_summary();
        Ok(batch)
    }

    /// Number of managed objects of `object_type`, walking every page.
    pub async fn count_managed_objects(&self, object_type: &str) -> SyncResult<usize> {
        pager::count_all(|cursor| {
            self.remote
                .query_managed_objects(object_type, &[], cursor)
        })
        .await
    }

    /// Check script hooks in every payload. With `validate` set, any invalid
    /// hook fails the whole import; otherwise it is only reported.
    fn gate<'a, I>(&self, payloads: I, validate: bool) -> SyncResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let invalid: Vec<&str> = payloads
            .into_iter()
            .filter_map(|(label, payload)| {
                let failure = first_invalid_hook(payload, self.checker.as_ref())?;
                error!(source = label, %failure, "invalid script hook");
                Some(label)
            })
            .collect();

        if invalid.is_empty() {
            return Ok(());
        }
        if validate {
            return Err(SyncError::Validation(format!(
                "invalid script hooks in {}",
                invalid.join(", ")
            )));
        }
        warn!(count = invalid.len(), "importing despite invalid script hooks");
        Ok(())
    }
}
