//! Builds runtime collaborators from settings

use crate::settings::{Settings, StorageBackend};
use kubevc_core::errors::ExError;
use kubevc_server::CommandRenderer;
use kubevc_store::{BlobStore, FsBlobStore, S3BlobStore, S3Config};
use std::sync::Arc;

pub fn build_store(settings: &Settings) -> Result<Arc<dyn BlobStore>, ExError> {
    match settings.storage.backend {
        StorageBackend::S3 => {
            let s3 = &settings.s3;
            let store = S3BlobStore::new(S3Config {
                bucket: s3.bucket.clone(),
                region: s3.region.clone(),
                access_key_id: s3.access_key_id.clone(),
                secret_access_key: s3.secret_access_key.clone(),
                endpoint: s3.endpoint.clone(),
                public_base_url: s3.public_base_url.clone(),
            })?;
            Ok(Arc::new(store))
        }
        StorageBackend::Local => Ok(Arc::new(FsBlobStore::new(&settings.storage.local_root))),
    }
}

pub fn build_renderer(settings: &Settings) -> CommandRenderer {
    CommandRenderer::new(settings.renderer.command.clone())
        .with_kubeconfig(settings.kube.resolved_path())
        .with_output_files(
            settings.renderer.artifact_file.clone(),
            settings.renderer.metadata_file.clone(),
        )
}
