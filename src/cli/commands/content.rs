use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use serde_json::{json, Value};

use super::connect_store;
use crate::cli::{utils::{output_rows, output_success}, OutputFormat};
use crate::content::validate::{slugify, validate_fields, Mode};
use crate::content::{ContentActions, ContentKind, KeyStyle, ListView};
use crate::filter::FilterOrder;
use crate::revalidate::NoopRevalidator;
use crate::store::{timestamp_now, ContentStore, RecordKey, Row};

#[derive(Subcommand)]
pub enum ContentCommands {
    #[command(about = "List rows of one content type")]
    List {
        #[arg(help = "Content type (route or table name, e.g. 'team-members' or 'team_members')")]
        kind: ContentKind,
        #[arg(long, help = "Only published rows, in public order")]
        public: bool,
        #[arg(long, help = "Override the ordering, e.g. 'created_at desc, title'")]
        order: Option<String>,
    },

    #[command(about = "Load fixture rows from a YAML file mapping content type to rows")]
    Seed {
        #[arg(help = "Path to the fixtures file")]
        file: PathBuf,
    },
}

pub async fn handle(cmd: ContentCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect_store()?;

    match cmd {
        ContentCommands::List { kind, public, order } => {
            let order = order.as_deref().map(FilterOrder::parse).transpose()?;
            let actions = ContentActions::new(store, Arc::new(NoopRevalidator));
            let view = if public { ListView::Public } else { ListView::Admin };

            let mut rows = actions.list(kind, view, &BTreeMap::new()).await?;
            if let Some(order) = &order {
                FilterOrder::sort_rows(&mut rows, order);
            }
            let rows: Vec<Value> = rows.into_iter().map(Value::Object).collect();

            let key_column = kind.spec().key_column();
            output_rows(&output_format, kind.as_str(), &rows, |row| {
                let key = row.get(key_column).map(text).unwrap_or_default();
                let title = row.get("title").or_else(|| row.get("name")).map(text).unwrap_or_default();
                format!("{:<38} {}", key, title)
            })
        }
        ContentCommands::Seed { file } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", file.display(), e))?;
            let fixtures: BTreeMap<String, Vec<Row>> = serde_yaml::from_str(&raw)?;

            let mut counts = serde_json::Map::new();
            for (name, rows) in fixtures {
                let kind: ContentKind = name.parse()?;
                let mut loaded = 0;
                for row in rows {
                    seed_row(store.as_ref(), kind, row)
                        .await
                        .map_err(|e| anyhow::anyhow!("{} row {}: {}", kind, loaded + 1, e))?;
                    loaded += 1;
                }
                tracing::info!("seeded {} {} rows", loaded, kind);
                counts.insert(kind.as_str().to_string(), json!(loaded));
            }

            output_success(
                &output_format,
                &format!("Seeded {} content types from {}", counts.len(), file.display()),
                Some(Value::Object(counts)),
            )
        }
    }
}

/// Fixture rows bypass authorization but not validation. Natural-key rows upsert so a fixture
/// file can be loaded more than once.
async fn seed_row(store: &dyn ContentStore, kind: ContentKind, input: Row) -> anyhow::Result<()> {
    let spec = kind.spec();
    let mut row = validate_fields(spec, &input, Mode::Create)?;

    if spec.slug && !row.contains_key("slug") {
        let title = row.get("title").and_then(Value::as_str).unwrap_or_default();
        row.insert("slug".to_string(), Value::String(slugify(title)));
    }
    if let Some(flag) = spec.publication {
        row.entry(flag.to_string()).or_insert(Value::Bool(false));
    }
    let now = timestamp_now();
    row.insert("created_at".to_string(), Value::String(now.clone()));
    row.insert("updated_at".to_string(), Value::String(now));

    match spec.key {
        KeyStyle::Id => {
            store.insert(spec.table, row).await?;
        }
        KeyStyle::Natural(column) => {
            let value = row.get(column).map(text).unwrap_or_default();
            store.upsert(spec.table, &RecordKey::new(column, value), row).await?;
        }
    }
    Ok(())
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
