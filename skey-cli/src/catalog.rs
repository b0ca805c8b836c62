use std::sync::Arc;

use anyhow::bail;
use anyhow::Context;
use skey_core::well_known;
use skey_core::ScaleRegistry;
use skey_core::StorageEntry;
use skey_types::StorageItemDescriptor;
use tracing::debug;
use tracing::info;

use crate::config::Config;

pub(crate) type Entry = StorageEntry<Arc<ScaleRegistry>>;

/// The storage entries the binary can derive keys for, sharing one registry.
pub(crate) struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    pub fn new(
        items: Vec<StorageItemDescriptor>,
        registry: ScaleRegistry,
    ) -> anyhow::Result<Self> {
        let registry = Arc::new(registry);
        let entries = items
            .into_iter()
            .map(|item| {
                let name = item.to_string();
                StorageEntry::new(item, registry.clone())
                    .with_context(|| format!("invalid storage item {name}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn load(config: &Config) -> anyhow::Result<Self> {
        let mut items = Vec::new();

        if let Some(path) = &config.catalog.path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to open catalog `{path}`"))?;
            items = parse_items(&content)
                .with_context(|| format!("failed to parse catalog `{path}`"))?;
            debug!("Loaded {} storage items from {}", items.len(), path);
        }

        if config.catalog.include_well_known {
            items.extend(well_known::items());
        }

        let registry = ScaleRegistry::new().with_aliases(config.codec.aliases());
        let catalog = Self::new(items, registry)?;
        info!("Catalog ready with {} entries", catalog.entries.len());

        Ok(catalog)
    }

    /// Looks an entry up by section (or storage prefix) and method.
    pub fn find(
        &self,
        section: &str,
        method: &str,
    ) -> anyhow::Result<&Entry> {
        match self.entries.iter().find(|entry| {
            (entry.section() == section || entry.prefix() == section) && entry.method() == method
        }) {
            Some(entry) => Ok(entry),
            None => bail!("unknown storage item {section}.{method}"),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

fn parse_items(content: &str) -> serde_json::Result<Vec<StorageItemDescriptor>> {
    serde_json::from_str(content)
}
