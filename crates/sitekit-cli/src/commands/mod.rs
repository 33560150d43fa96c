pub mod config;
pub mod cookies;
pub mod inspect;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use sitekit_core::storage::FileStore;
use sitekit_core::dom::Document;
use sitekit_core::{AppConfig, PageFixture};

/// Load a fixture and the config it runs under
pub(crate) fn load_fixture(config: &AppConfig, path: &Path) -> Result<(AppConfig, PageFixture, Document)> {
    let fixture = PageFixture::load(path)
        .with_context(|| format!("Failed to load fixture {}", path.display()))?;
    let mut config = config.clone();
    fixture.apply_to(&mut config);
    let doc = fixture.build_document();
    Ok((config, fixture, doc))
}

pub(crate) fn open_store(config: &AppConfig) -> Arc<FileStore> {
    Arc::new(FileStore::new(config.store_path()))
}
