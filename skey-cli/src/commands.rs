use anyhow::Context;
use clap::Args;
use clap::Subcommand;
use serde_json::json;
use skey_core::ArgumentEncoder;
use skey_core::StorageEntry;
use skey_types::StorageKey;
use skey_types::Value;
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::OutputFormat;

#[derive(Args, Clone, Debug)]
pub(crate) struct ItemRef {
    /// Pallet section or storage prefix, e.g. `system`
    section: String,

    /// Storage item name, e.g. `Account`
    method: String,
}

#[derive(Subcommand, Clone, Debug)]
pub(crate) enum Command {
    /// Derive the full key of a storage entry
    Key {
        #[clap(flatten)]
        item: ItemRef,

        /// Key arguments as JSON literals; bare words are taken as strings
        #[clap(allow_negative_numbers = true)]
        args: Vec<String>,
    },
    /// Derive the prefix under which all entries of a map live
    IterKey {
        #[clap(flatten)]
        item: ItemRef,

        /// First key of a double map, narrowing the range
        arg: Option<String>,
    },
    /// Print the unprefixed key bytes to scan for
    KeyPrefix {
        #[clap(flatten)]
        item: ItemRef,

        arg: Option<String>,
    },
    /// Print the JSON view of a storage item
    Describe {
        #[clap(flatten)]
        item: ItemRef,
    },
    /// List the storage items of the catalog
    List,
    /// Recover the arguments encoded in a full key
    Decode {
        #[clap(flatten)]
        item: ItemRef,

        /// Length-prefixed key as hex
        key: String,
    },
}

impl Command {
    /// Runs the command and returns what should be printed.
    pub(crate) fn run(
        &self,
        catalog: &Catalog,
        format: OutputFormat,
    ) -> anyhow::Result<String> {
        debug!("Running {self:?}");

        match self {
            Command::Key { item, args } => {
                let entry = item.find(catalog)?;
                let args = args
                    .iter()
                    .map(String::as_str)
                    .map(parse_arg)
                    .collect::<anyhow::Result<Vec<_>>>()?;
                let key = entry
                    .key(&args)
                    .with_context(|| format!("while deriving the key of {}", entry.item()))?;

                render_key(format, entry, &key, None)
            },
            Command::IterKey { item, arg } => {
                let entry = item.find(catalog)?;
                let arg = arg.as_deref().map(parse_arg).transpose()?;
                let key = entry
                    .iter_key(arg.as_ref())
                    .with_context(|| format!("while deriving the iteration key of {}", entry.item()))?;

                let head = match format {
                    OutputFormat::Json => Some(serde_json::to_value(entry.head_meta()?)?),
                    OutputFormat::Hex => None,
                };
                render_key(format, entry, &key, head)
            },
            Command::KeyPrefix { item, arg } => {
                let entry = item.find(catalog)?;
                let arg = arg.as_deref().map(parse_arg).transpose()?;
                let prefix = entry
                    .key_prefix(arg.as_ref())
                    .with_context(|| format!("while deriving the key prefix of {}", entry.item()))?;
                let prefix = Value::Bytes(prefix).to_json();

                Ok(match format {
                    OutputFormat::Hex => prefix.as_str().unwrap_or_default().to_string(),
                    OutputFormat::Json => json!({
                        "item": entry.item().to_string(),
                        "prefix": prefix,
                    })
                    .to_string(),
                })
            },
            Command::Describe { item } => {
                let entry = item.find(catalog)?;
                Ok(serde_json::to_string_pretty(&entry.to_json()?)?)
            },
            Command::List => {
                let entries = catalog.entries();
                Ok(match format {
                    OutputFormat::Hex => entries
                        .iter()
                        .map(|entry| format!("{} {}", entry.item(), entry.shape().name()))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    OutputFormat::Json => serde_json::Value::Array(
                        entries
                            .iter()
                            .map(|entry| {
                                json!({
                                    "section": entry.section(),
                                    "method": entry.method(),
                                    "shape": entry.shape().name(),
                                })
                            })
                            .collect(),
                    )
                    .to_string(),
                })
            },
            Command::Decode { item, key } => {
                let entry = item.find(catalog)?;
                let key = key
                    .parse::<StorageKey>()
                    .with_context(|| format!("invalid key `{key}`"))?;
                let args = entry
                    .decode_key_args(&key)
                    .with_context(|| format!("while decoding a key of {}", entry.item()))?;

                Ok(serde_json::Value::Array(args.iter().map(Value::to_json).collect()).to_string())
            },
        }
    }
}

impl ItemRef {
    fn find<'a>(
        &self,
        catalog: &'a Catalog,
    ) -> anyhow::Result<&'a crate::catalog::Entry> {
        catalog.find(&self.section, &self.method)
    }
}

fn render_key<E: ArgumentEncoder>(
    format: OutputFormat,
    entry: &StorageEntry<E>,
    key: &StorageKey,
    head: Option<serde_json::Value>,
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Hex => key.to_hex(),
        OutputFormat::Json => {
            let mut out = json!({
                "item": entry.item().to_string(),
                "key": key,
                "body": Value::Bytes(key.body().to_vec()).to_json(),
            });
            if let Some(head) = head {
                out["head"] = head;
            }
            serde_json::to_string(&out)?
        },
    })
}

/// Arguments are JSON literals; anything that does not parse is taken as a string,
/// so `0x..` hex becomes bytes and bare words become text.
fn parse_arg(raw: &str) -> anyhow::Result<Value> {
    let json = serde_json::from_str::<serde_json::Value>(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Value::try_from(json).with_context(|| format!("invalid argument `{raw}`"))
}
