//! Social identity provider export and import.
//!
//! A provider bundle also carries the provider's `transform` script so the
//! pair can be promoted together. On import the script is written first.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::scripts::create_or_update_script;
use super::FileExport;
use crate::batch::{from_outcomes, BatchResult};
use crate::bundle::{BundleContext, ExportBundle};
use crate::error::{SyncError, SyncResult};
use crate::files::{self, ExportKind};
use crate::model::IdpProvider;
use crate::remote::{IdpRemote, ScriptRemote};

/// Export and import of social identity providers.
pub struct IdpSync<R> {
    remote: Arc<R>,
    context: BundleContext,
}

impl<R: IdpRemote + ScriptRemote> IdpSync<R> {
    pub fn new(remote: Arc<R>, context: BundleContext) -> Self {
        Self { remote, context }
    }

    /// Every provider, sorted by id.
    pub async fn list_providers(&self) -> SyncResult<Vec<IdpProvider>> {
        let mut providers = self
            .remote
            .list_providers()
            .await?
            .into_iter()
            .map(IdpProvider::from_value)
            .collect::<SyncResult<Vec<_>>>()?;
        providers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(providers)
    }

    /// The provider with `id`; exactly one must exist.
    pub async fn get_provider_by_id(&self, id: &str) -> SyncResult<IdpProvider> {
        let mut found: Vec<IdpProvider> = self
            .list_providers()
            .await?
            .into_iter()
            .filter(|p| p.id == id)
            .collect();
        match found.len() {
            0 => Err(SyncError::not_found(format!("provider '{id}'"))),
            1 => Ok(found.remove(0)),
            n => Err(SyncError::Validation(format!("{n} providers '{id}' found"))),
        }
    }

    async fn add_to_bundle(&self, bundle: &mut ExportBundle, provider: IdpProvider) -> SyncResult<()> {
        if let Some(script_id) = &provider.transform {
            let script = self.remote.get_script(script_id).await?;
            bundle.insert_script(script.into_saved()?);
        }
        bundle.insert_provider(provider);
        Ok(())
    }

    /// Export one provider to `file`, or `<id>.idp.json`.
    pub async fn export_provider(&self, id: &str, file: Option<&Path>) -> SyncResult<PathBuf> {
        let path = file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(files::typed_filename(id, ExportKind::Idp)));
        let provider = self.get_provider_by_id(id).await?;
        let mut bundle: ExportBundle = self.context.bundle();
        self.add_to_bundle(&mut bundle, provider).await?;
        bundle.write(&path)?;
        info!(id, path = %path.display(), "exported provider");
        Ok(path)
    }

    /// Export every provider into one bundle.
    pub async fn export_providers_to_file(&self, file: Option<&Path>) -> SyncResult<FileExport> {
        let start = Instant::now();
        let path = file.map(Path::to_path_buf).unwrap_or_else(|| {
            PathBuf::from(files::bulk_filename(&self.context.realm, "Providers", ExportKind::Idp))
        });

        let mut bundle: ExportBundle = self.context.bundle();
        let mut outcomes = Vec::new();
        for provider in self.list_providers().await? {
            let id = provider.id.clone();
            let outcome = self.add_to_bundle(&mut bundle, provider).await;
            outcomes.push((id, outcome));
        }
        bundle.write(&path)?;

        let mut batch = from_outcomes("export providers to file", outcomes);
        batch.set_duration(start.elapsed().as_millis() as u64);
        batch.log_summary();
        Ok(FileExport { path, batch })
    }

    /// Export one `<id>.idp.json` bundle per provider into `dir`.
    pub async fn export_providers_to_files(&self, dir: &Path) -> SyncResult<BatchResult> {
        let mut outcomes = Vec::new();
        for provider in self.list_providers().await? {
            let id = provider.id.clone();
            let path = dir.join(files::typed_filename(&id, ExportKind::Idp));
            let mut bundle: ExportBundle = self.context.bundle();
            let outcome = match self.add_to_bundle(&mut bundle, provider).await {
                Ok(()) => bundle.write(&path),
                Err(e) => Err(e),
            };
            outcomes.push((id, outcome));
        }
        let batch = from_outcomes("export providers to files", outcomes);
        batch.log_summary();
        Ok(batch)
    }

    /// Write one provider from `bundle`, transform script first.
    async fn import_from_bundle(&self, bundle: &ExportBundle, id: &str) -> SyncResult<()> {
        let payload = bundle
            .idp
            .get(id)
            .ok_or_else(|| SyncError::not_found(format!("provider '{id}' in bundle")))?;
        let provider = IdpProvider::from_value(payload.clone())?;

        if let Some(script_id) = &provider.transform {
            match bundle.script.get(script_id) {
                Some(saved) => {
                    create_or_update_script(self.remote.as_ref(), script_id, saved.clone().into_wire())
                        .await?;
                }
                None => warn!(
                    provider = %provider.id,
                    script = %script_id,
                    "transform script not in bundle, importing provider without it"
                ),
            }
        }

        self.remote
            .put_provider(&provider.type_id, &provider.id, &provider.payload)
            .await?;
        info!(id = %provider.id, "imported provider");
        Ok(())
    }

    /// Import the provider `id` from a bundle file.
    pub async fn import_provider_by_id(&self, id: &str, file: &Path) -> SyncResult<()> {
        let bundle: ExportBundle = ExportBundle::read(file)?;
        if !bundle.idp.contains_key(id) {
            return Err(SyncError::not_found(format!(
                "provider '{id}' in {}",
                file.display()
            )));
        }
        self.import_from_bundle(&bundle, id).await
    }

    /// Import the first provider in a bundle file.
    pub async fn import_first_provider(&self, file: &Path) -> SyncResult<String> {
        let bundle: ExportBundle = ExportBundle::read(file)?;
        let id = bundle
            .idp
            .keys()
            .next()
            .cloned()
            .ok_or_else(|| SyncError::InvalidBundle(format!("{}: no providers", file.display())))?;
        self.import_from_bundle(&bundle, &id).await?;
        Ok(id)
    }

    /// Import every provider in a bundle file.
    pub async fn import_providers_from_file(&self, file: &Path) -> SyncResult<BatchResult> {
        let start = Instant::now();
        let bundle: ExportBundle = ExportBundle::read(file)?;
        let mut batch = self.import_bundle("import providers", &bundle).await;
        batch.set_duration(start.elapsed().as_millis() as u64);
        batch.log_summary();
        Ok(batch)
    }

    /// Import every `*.idp.json` bundle in `dir`.
    pub async fn import_providers_from_files(&self, dir: &Path) -> SyncResult<BatchResult> {
        let start = Instant::now();
        let mut batch = BatchResult::new("import providers from files", 0);
        for file in files::collect_files(dir, &ExportKind::Idp.json_suffix(), false)? {
            let part = match ExportBundle::read(&file.path) {
                Ok(bundle) => self.import_bundle("import providers", &bundle).await,
                Err(e) => from_outcomes("import providers", [(file.relative, Err(e))]),
            };
            batch.merge(part);
        }
        batch.set_duration(start.elapsed().as_millis() as u64);
        batch.log_summary();
        Ok(batch)
    }

    async fn import_bundle(&self, operation: &str, bundle: &ExportBundle) -> BatchResult {
        for missing in bundle.missing_transform_scripts() {
            warn!(script = %missing, "bundle references a transform script it does not contain");
        }
        let mut outcomes = Vec::with_capacity(bundle.idp.len());
        for id in bundle.idp.keys() {
            outcomes.push((id.clone(), self.import_from_bundle(bundle, id).await));
        }
        from_outcomes(operation, outcomes)
    }
}
