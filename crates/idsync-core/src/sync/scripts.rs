//! Script export and import.
//!
//! Imports run one script at a time so that renames applied by the
//! collision policy are deterministic when a bundle holds several scripts
//! with the same name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use super::FileExport;
use crate::batch::{from_outcomes, BatchResult};
use crate::bundle::{BundleContext, ExportBundle};
use crate::collision::write_with_rename;
use crate::error::{SyncError, SyncResult};
use crate::files::{self, ExportKind};
use crate::model::Script;
use crate::remote::ScriptRemote;
use crate::transform::script_codec;
use crate::validation::{self, JavaScriptChecker, SyntaxChecker};

/// Options for [`ScriptSync::import_scripts_from_file`].
#[derive(Debug, Clone, Default)]
pub struct ScriptImportOptions {
    /// Import only the first script, under this name.
    pub name: Option<String>,
    /// Give every imported script a fresh id.
    pub re_uuid: bool,
    /// Reject JavaScript bodies that fail the syntax check.
    pub validate: bool,
}

/// Write `script` under `id`, renaming it while its name collides with
/// another script. Returns the name it was stored under.
pub async fn create_or_update_script<R>(remote: &R, id: &str, script: Script) -> SyncResult<String>
where
    R: ScriptRemote + ?Sized,
{
    let original = script.name.clone();
    let mut script = script;
    let stored = write_with_rename(&original, |name| {
        script.name = name;
        let candidate = script.clone();
        async move { remote.put_script(id, &candidate).await }
    })
    .await?;
    if stored != original {
        info!(id, from = %original, to = %stored, "script imported under a new name");
    }
    Ok(stored)
}

/// Export and import of authentication scripts.
pub struct ScriptSync<R> {
    remote: Arc<R>,
    context: BundleContext,
    checker: Arc<dyn SyntaxChecker>,
}

impl<R: ScriptRemote> ScriptSync<R> {
    pub fn new(remote: Arc<R>, context: BundleContext) -> Self {
        Self {
            remote,
            context,
            checker: Arc::new(JavaScriptChecker),
        }
    }

    pub fn with_checker(mut self, checker: Arc<dyn SyntaxChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Every script, sorted by name.
    pub async fn list_scripts(&self) -> SyncResult<Vec<Script>> {
        let mut scripts = self.remote.list_scripts().await?;
        scripts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(scripts)
    }

    /// Export every script named `name` to `file`, or `<name>.script.json`.
    pub async fn export_script_by_name(&self, name: &str, file: Option<&Path>) -> SyncResult<PathBuf> {
        let path = file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(files::typed_filename(name, ExportKind::Script)));
        let scripts = self.remote.get_scripts_by_name(name).await?;
        if scripts.is_empty() {
            return Err(SyncError::not_found(format!("script '{name}'")));
        }
        if scripts.len() > 1 {
            warn!(name, count = scripts.len(), "multiple scripts share this name");
        }

        let mut bundle: ExportBundle = self.context.bundle();
        for script in scripts {
            bundle.insert_script(script.into_saved()?);
        }
        bundle.write(&path)?;
        info!(name, path = %path.display(), "exported script");
        Ok(path)
    }

    /// Export every script into one bundle.
    pub async fn export_scripts_to_file(&self, file: Option<&Path>) -> SyncResult<FileExport> {
        let start = Instant::now();
        let path = file.map(Path::to_path_buf).unwrap_or_else(|| {
            PathBuf::from(files::bulk_filename(&self.context.realm, "Scripts", ExportKind::Script))
        });
        let scripts = self.list_scripts().await?;

        let mut bundle: ExportBundle = self.context.bundle();
        let mut outcomes = Vec::with_capacity(scripts.len());
        for script in scripts {
            let name = script.name.clone();
            let outcome = script.into_saved().map(|saved| bundle.insert_script(saved));
            outcomes.push((name, outcome));
        }
        bundle.write(&path)?;

        let mut batch = from_outcomes("export scripts to file", outcomes);
        batch.set_duration(start.elapsed().as_millis() as u64);
        batch.log_summary();
        Ok(FileExport { path, batch })
    }

    /// Export one `<name>.script.json` bundle per script name into `dir`.
    pub async fn export_scripts_to_files(&self, dir: &Path) -> SyncResult<BatchResult> {
        let groups = group_by_name(self.list_scripts().await?);
        let outcomes = groups.into_iter().map(|(name, scripts)| {
            let outcome = self.write_named_bundle(dir, &name, scripts);
            (name, outcome)
        });
        let batch = from_outcomes("export scripts to files", outcomes);
        batch.log_summary();
        Ok(batch)
    }

    fn write_named_bundle(&self, dir: &Path, name: &str, scripts: Vec<Script>) -> SyncResult<()> {
        let mut bundle: ExportBundle = self.context.bundle();
        for script in scripts {
            bundle.insert_script(script.into_saved()?);
        }
        bundle.write(&dir.join(files::typed_filename(name, ExportKind::Script)))
    }

    /// Export each script as a source file `<name>.script.js|groovy` plus a
    /// `<name>.meta.json` bundle whose `script` field names that file.
    pub async fn export_scripts_extract(&self, dir: &Path) -> SyncResult<BatchResult> {
        let groups = group_by_name(self.list_scripts().await?);
        let outcomes = groups.into_iter().map(|(name, scripts)| {
            let outcome = self.write_extracted(dir, &name, scripts);
            (name, outcome)
        });
        let batch = from_outcomes("extract scripts", outcomes);
        batch.log_summary();
        Ok(batch)
    }

    fn write_extracted(&self, dir: &Path, name: &str, scripts: Vec<Script>) -> SyncResult<()> {
        let mut meta: ExportBundle<String> = self.context.bundle();
        for script in scripts {
            let source = script.source()?;
            let source_file =
                files::typed_filename_with_ext(&script.name, ExportKind::Script, script.language.extension());
            files::write_text(&dir.join(&source_file), &source)?;
            meta.insert_script(script.with_body(source_file));
        }
        meta.write(&dir.join(files::typed_filename(name, ExportKind::Meta)))
    }

    /// Write one script, applying the collision policy.
    pub async fn create_or_update_script(&self, id: &str, script: Script) -> SyncResult<String> {
        create_or_update_script(self.remote.as_ref(), id, script).await
    }

    /// Check a script's body; only JavaScript is checked.
    pub fn validate_script(&self, script: &Script) -> SyncResult<()> {
        validation::validate_script(script, self.checker.as_ref())
    }

    /// Import the scripts in a bundle file.
    pub async fn import_scripts_from_file(
        &self,
        file: &Path,
        options: &ScriptImportOptions,
    ) -> SyncResult<BatchResult> {
        let start = Instant::now();
        let bundle: ExportBundle = ExportBundle::read(file)?;

        let mut outcomes = Vec::new();
        for saved in bundle.script.into_values() {
            let mut script = saved.into_wire();
            if options.re_uuid {
                let fresh = Uuid::new_v4().to_string();
                info!(name = %script.name, from = %script.id, to = %fresh, "assigning new script id");
                script.id = fresh;
            }
            if let Some(name) = &options.name {
                script.name = name.clone();
            }
            let label = script.name.clone();
            let outcome = self.import_one(script, options.validate).await;
            outcomes.push((label, outcome));
            if options.name.is_some() {
                break;
            }
        }

        let mut batch = from_outcomes("import scripts", outcomes);
        batch.set_duration(start.elapsed().as_millis() as u64);
        batch.log_summary();
        Ok(batch)
    }

    /// Import every `*.meta.json` file under `dir` together with the source
    /// file each one names (relative to the meta file).
    pub async fn import_extracted_scripts(&self, dir: &Path, validate: bool) -> SyncResult<BatchResult> {
        let start = Instant::now();
        let suffix = ExportKind::Meta.json_suffix();

        let mut outcomes = Vec::new();
        for meta_file in files::collect_files(dir, &suffix, true)? {
            let bundle = match ExportBundle::<String>::read(&meta_file.path) {
                Ok(bundle) => bundle,
                Err(e) => {
                    outcomes.push((meta_file.relative.clone(), Err(e)));
                    continue;
                }
            };
            let base = meta_file.path.parent().unwrap_or(dir).to_path_buf();
            for script in bundle.script.into_values() {
                let label = script.name.clone();
                let outcome = match files::read_text(&base.join(&script.script)) {
                    Ok(source) => {
                        let script = script.with_body(script_codec::encode_text(&source));
                        self.import_one(script, validate).await
                    }
                    Err(e) => Err(e),
                };
                outcomes.push((label, outcome));
            }
        }

        let mut batch = from_outcomes("import extracted scripts", outcomes);
        batch.set_duration(start.elapsed().as_millis() as u64);
        batch.log_summary();
        Ok(batch)
    }

    async fn import_one(&self, script: Script, validate: bool) -> SyncResult<()> {
        if let Err(e) = self.validate_script(&script) {
            if validate {
                return Err(e);
            }
            warn!(name = %script.name, error = %e, "importing script that failed validation");
        }
        let id = script.id.clone();
        self.create_or_update_script(&id, script).await.map(|_| ())
    }
}

fn group_by_name(scripts: Vec<Script>) -> BTreeMap<String, Vec<Script>> {
    let mut groups: BTreeMap<String, Vec<Script>> = BTreeMap::new();
    for script in scripts {
        groups.entry(script.name.clone()).or_default().push(script);
    }
    groups
}
