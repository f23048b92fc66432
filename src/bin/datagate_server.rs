use clap::Parser;
use datagate::{
    handler_fn, load_settings, CallerIdentity, DataView, Database, Dispatcher, OperationKind,
    PermissionRule, RuntimeConfig, RuntimeError,
};
use log::info;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Command line options for the datagate server binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Port for the HTTP server; overrides the configured listen address
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Ownership rule shared by the demo task operations: the row must belong to
/// the caller. Delete results only carry the id, so the rule falls back to
/// looking the row up through the supplied view.
fn owner_rule() -> Arc<dyn PermissionRule> {
    Arc::new(
        |row: &Value, view: &dyn DataView, caller: &CallerIdentity| {
            let Some(caller_id) = caller.id.as_deref() else {
                return Ok(false);
            };

            if let Some(owner) = row.get("owner_id").and_then(Value::as_str) {
                return Ok(owner == caller_id);
            }

            if let Some(id) = row.get("id").and_then(Value::as_str) {
                let stored = view.get_row("task", id)?;
                return Ok(stored
                    .and_then(|r| r.get("owner_id").and_then(Value::as_str).map(String::from))
                    .as_deref()
                    == Some(caller_id));
            }

            Ok(false)
        },
    )
}

/// A small task application so the server is exercisable out of the box.
fn demo_config() -> RuntimeConfig {
    RuntimeConfig::new()
        .with_function(
            "createTask",
            OperationKind::Create,
            handler_fn(|ctx, params| {
                Box::pin(async move {
                    let title = params
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or("untitled")
                        .to_string();
                    let id = ctx.new_id();
                    let row = json!({
                        "id": id,
                        "title": title,
                        "done": false,
                        "owner_id": ctx.identity(),
                        "created_at": ctx.now(),
                    });
                    ctx.insert("task", &id, row.clone())?;
                    Ok(Some(row))
                })
            }),
        )
        .with_function(
            "getTask",
            OperationKind::Get,
            handler_fn(|ctx, params| {
                Box::pin(async move {
                    let id = require_id(&params)?;
                    let row = ctx.get("task", &id)?.ok_or_else(|| {
                        RuntimeError::Function(format!("task '{}' not found", id))
                    })?;
                    Ok(Some(row))
                })
            }),
        )
        .with_function(
            "listTasks",
            OperationKind::List,
            handler_fn(|ctx, _params| {
                Box::pin(async move { Ok(Some(Value::Array(ctx.list("task")?))) })
            }),
        )
        .with_function(
            "updateTask",
            OperationKind::Update,
            handler_fn(|ctx, params| {
                Box::pin(async move {
                    let id = require_id(&params)?;
                    let changes = params.get("values").cloned().unwrap_or(json!({}));
                    let row = ctx.update("task", &id, changes)?;
                    Ok(Some(row))
                })
            }),
        )
        .with_function(
            "deleteTask",
            OperationKind::Delete,
            handler_fn(|ctx, params| {
                Box::pin(async move {
                    let id = require_id(&params)?;
                    ctx.delete("task", &id)?;
                    Ok(Some(json!(id)))
                })
            }),
        )
        .with_rule("createTask", owner_rule())
        .with_rule("getTask", owner_rule())
        .with_rule("listTasks", owner_rule())
        .with_rule("updateTask", owner_rule())
        .with_rule("deleteTask", owner_rule())
}

fn require_id(params: &Value) -> Result<String, RuntimeError> {
    params
        .get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| RuntimeError::Function("missing required param 'id'".to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting Datagate Server...");

    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;
    info!("Settings loaded successfully");

    let bind_address = match cli.port {
        Some(port) => format!("127.0.0.1:{}", port),
        None => settings.listen_address.clone(),
    };

    let db = Database::open(&settings.storage_path)?;
    info!("Row store opened at {}", settings.storage_path.display());

    let dispatcher = Arc::new(Dispatcher::new(db, demo_config()));

    datagate::server::run_server(dispatcher, &bind_address).await?;
    Ok(())
}
