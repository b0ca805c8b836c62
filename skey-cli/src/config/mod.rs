use anyhow::ensure;
use anyhow::Context;
use config::FileFormat;
use lazy_static_include::*;
use serde_derive::Deserialize;
use tracing::debug;

lazy_static_include_str! {
    DEFAULT_CONFIG => "src/config/default.toml",
}

/// Prefix of environment overrides, e.g. `SKEY__OUTPUT__FORMAT=json`.
const ENV_PREFIX: &str = "SKEY";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub(crate) catalog: CatalogConfig,
    pub(crate) codec: CodecConfig,
    pub(crate) output: OutputConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct CatalogConfig {
    /// JSON file with the storage item descriptors to derive keys for.
    pub(crate) path: Option<String>,
    pub(crate) include_well_known: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct CodecConfig {
    pub(crate) aliases: Vec<AliasConfig>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct AliasConfig {
    pub(crate) name: String,
    pub(crate) target: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct OutputConfig {
    pub(crate) format: OutputFormat,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    Hex,
    Json,
}

impl CatalogConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.path {
            ensure!(!path.is_empty(), "Catalog path is empty");
        }
        ensure!(
            self.path.is_some() || self.include_well_known,
            "Catalog is empty: set catalog.path or catalog.include_well_known"
        );
        Ok(())
    }
}

impl CodecConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        for alias in &self.aliases {
            ensure!(!alias.name.is_empty(), "Alias name is required");
            ensure!(
                !alias.target.is_empty(),
                "Alias `{}` has no target type",
                alias.name
            );
        }
        Ok(())
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|alias| (alias.name.as_str(), alias.target.as_str()))
    }
}

impl Config {
    pub fn load(local_file: Option<&str>) -> anyhow::Result<Config> {
        let mut config_builder = config::Config::builder();
        config_builder =
            config_builder.add_source(config::File::from_str(&DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(local_file) = local_file {
            debug!("Loading local configuration from {}", local_file);
            config_builder = config_builder.add_source(config::File::with_name(local_file));
        }

        config_builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .ignore_empty(true),
            )
            .build()
            .context("Could not load configuration")?
            .try_deserialize()
            .context("Could not deserialize configuration")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.catalog.validate()?;
        self.codec.validate()
    }
}
