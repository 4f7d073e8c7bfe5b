//! exq CLI — operator interface to execution queues in Redis.

use clap::{Parser, Subcommand};
use exec_queue::backend::RedisBackend;
use exec_queue::config::Config;
use exec_queue::config::secrets::ExposeSecret;
use exec_queue::telemetry::{TelemetryConfig, init_telemetry};
use exec_queue::{ExecutionQueue, ExecutionQueueDetail, ExecutionQueueStore};

type Store = ExecutionQueueStore<RedisBackend>;

#[derive(Parser)]
#[command(name = "exq", about = "Inspect and drive shared execution queues")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a queue, optionally with an initial batch of details
    Create {
        /// Queue ID (a random UUID when omitted)
        #[arg(long)]
        id: Option<String>,
        /// JSON object of extra metadata fields
        #[arg(long)]
        attrs: Option<String>,
        /// JSON array of detail objects
        #[arg(long)]
        details: Option<String>,
    },
    /// Append details to a queue's backlog
    Push {
        queue_id: String,
        /// JSON array of detail objects
        details: String,
    },
    /// Pop the next detail
    Pop { queue_id: String },
    /// List the backlog without consuming it
    List { queue_id: String },
    /// Show a queue's metadata and status
    Show { queue_id: String },
    /// Print the backlog length
    Size { queue_id: String },
    /// Delete a queue's metadata and backlog
    Delete { queue_id: String },
    /// Pop until the queue is empty, printing each detail
    Drain { queue_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "exq".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let backend = RedisBackend::connect(config.redis_url.expose_secret()).await?;
    backend.health_check().await?;
    let store = ExecutionQueueStore::with_ttl(backend, config.queue_ttl);

    match cli.command {
        Command::Create { id, attrs, details } => cmd_create(&store, id, attrs, details).await,
        Command::Push { queue_id, details } => {
            let details = parse_details(&details)?;
            store.append_details(&queue_id, &details).await?;
            println!("Appended {} detail(s) to {queue_id}", details.len());
            Ok(())
        }
        Command::Pop { queue_id } => {
            match store.pop_next(&queue_id).await? {
                Some(detail) => println!("{}", serde_json::to_string_pretty(&detail)?),
                None => println!("Queue {queue_id} is empty."),
            }
            Ok(())
        }
        Command::List { queue_id } => cmd_list(&store, &queue_id).await,
        Command::Show { queue_id } => cmd_show(&store, &queue_id).await,
        Command::Size { queue_id } => {
            println!("{}", store.size(&queue_id).await?);
            Ok(())
        }
        Command::Delete { queue_id } => {
            store.delete_queue(&queue_id).await?;
            println!("Deleted {queue_id}");
            Ok(())
        }
        Command::Drain { queue_id } => cmd_drain(&store, &queue_id).await,
    }
}

async fn cmd_create(
    store: &Store,
    id: Option<String>,
    attrs: Option<String>,
    details: Option<String>,
) -> anyhow::Result<()> {
    let queue_id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut queue = ExecutionQueue::new(&queue_id);

    if let Some(json) = attrs {
        let value: serde_json::Value = serde_json::from_str(&json)?;
        let serde_json::Value::Object(mut fields) = value else {
            anyhow::bail!("--attrs must be a JSON object");
        };
        // The id comes from --id, not the attribute map.
        fields.remove("queueId");
        queue.attributes = fields;
    }

    match details {
        Some(json) => {
            let details = parse_details(&json)?;
            store.create_queue_with_details(&queue, &details).await?;
            println!("Created: {queue_id} ({} detail(s))", details.len());
        }
        None => {
            store.create_queue(&queue).await?;
            println!("Created: {queue_id}");
        }
    }
    Ok(())
}

async fn cmd_list(store: &Store, queue_id: &str) -> anyhow::Result<()> {
    let details = store.list_details(queue_id).await?;
    if details.is_empty() {
        println!("No details queued.");
        return Ok(());
    }

    for (index, detail) in details.iter().enumerate() {
        println!("{index:>4}  {}", serde_json::to_string(detail)?);
    }
    println!("\n{} detail(s)", details.len());
    Ok(())
}

async fn cmd_show(store: &Store, queue_id: &str) -> anyhow::Result<()> {
    let status = store.status(queue_id).await?;
    println!("Queue:      {queue_id}");
    println!("Status:     {status}");

    match store.get_queue(queue_id).await? {
        Some(queue) => println!(
            "Metadata:   {}",
            serde_json::to_string_pretty(&queue.attributes)?
        ),
        None => println!("Metadata:   -"),
    }
    Ok(())
}

async fn cmd_drain(store: &Store, queue_id: &str) -> anyhow::Result<()> {
    let mut count = 0usize;
    while let Some(detail) = store.pop_next(queue_id).await? {
        count += 1;
        println!("{}", serde_json::to_string(&detail)?);
    }
    println!("\nDrained {count} detail(s) from {queue_id}");
    Ok(())
}

fn parse_details(json: &str) -> anyhow::Result<Vec<ExecutionQueueDetail>> {
    let details: Vec<ExecutionQueueDetail> = serde_json::from_str(json)
        .map_err(|e| anyhow::anyhow!("details must be a JSON array of objects: {e}"))?;
    Ok(details)
}
