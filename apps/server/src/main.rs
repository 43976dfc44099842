use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use shopchat_config::load as load_config;
use shopchat_gateway::{create_router, GatewayState};
use shopchat_runtime::{telemetry, BackendServices};
use sqlx::Row;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "shopchat-server")]
#[command(about = "Shopchat messaging backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and websocket server (default)
    Serve,
    /// Dump conversations and messages from the database
    DumpData,
    /// Seed the database with demo users and conversations
    SeedData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::DumpData => dump_data().await,
        Commands::SeedData => seed_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting shopchat backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = GatewayState::new(services.db_pool.clone(), &config.realtime);
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shopchat_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("dumping conversations from database");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let conversations = sqlx::query(
        r#"
        SELECT conversation_id, name, is_group, host_id, created_at
        FROM conversations
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch conversations")?;

    println!("=== CONVERSATIONS ===");
    if conversations.is_empty() {
        println!("No conversations found in database");
    } else {
        println!("Found {} conversations:", conversations.len());
        println!(
            "{:<15} {:<30} {:<10} {:<12} {:<25}",
            "ID", "Name", "Group", "Host", "Created At"
        );
        println!("{}", "-".repeat(95));

        for conversation in conversations {
            let conversation_id: String = conversation.get("conversation_id");
            let name: String = conversation.get("name");
            let is_group: bool = conversation.get("is_group");
            let host_id: Option<String> = conversation.get("host_id");
            let created_at: String = conversation.get("created_at");

            println!(
                "{:<15} {:<30} {:<10} {:<12} {:<25}",
                conversation_id,
                name,
                is_group,
                host_id.as_deref().unwrap_or("NULL"),
                created_at
            );
        }
    }

    println!("\n=== MESSAGES ===");
    let messages = sqlx::query(
        r#"
        SELECT message_id, conversation_id, sender_id, content, is_read, created_at
        FROM messages
        ORDER BY created_at ASC, message_id ASC
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch messages")?;

    if messages.is_empty() {
        println!("No messages found in database");
    } else {
        println!("Found {} messages:", messages.len());
        println!(
            "{:<10} {:<15} {:<12} {:<50} {:<8} {:<25}",
            "ID", "Conversation", "Sender", "Content (truncated)", "Read", "Created At"
        );
        println!("{}", "-".repeat(125));

        for message in messages {
            let message_id: i64 = message.get("message_id");
            let conversation_id: String = message.get("conversation_id");
            let sender_id: String = message.get("sender_id");
            let content: String = message.get("content");
            let is_read: bool = message.get("is_read");
            let created_at: String = message.get("created_at");

            let content_display = if content.len() > 47 {
                format!("{}...", &content[..44])
            } else {
                content
            };

            println!(
                "{:<10} {:<15} {:<12} {:<50} {:<8} {:<25}",
                message_id, conversation_id, sender_id, content_display, is_read, created_at
            );
        }
    }

    Ok(())
}

async fn seed_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("seeding database with demo data");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let now = Utc::now().to_rfc3339();

    for (user_id, username, email) in [
        ("demo-alice", "alice", "alice@example.com"),
        ("demo-bob", "bob", "bob@example.com"),
        ("demo-carol", "carol", "carol@example.com"),
    ] {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (user_id, username, email)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(email)
        .execute(&services.db_pool)
        .await
        .with_context(|| format!("failed to insert demo user {user_id}"))?;
    }

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO conversations (conversation_id, name, is_group, host_id, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind("demo-direct")
    .bind("alice & bob")
    .bind(false)
    .bind("demo-alice")
    .bind(&now)
    .execute(&services.db_pool)
    .await
    .context("failed to insert demo direct conversation")?;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO conversations (conversation_id, name, is_group, host_id, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind("demo-group")
    .bind("Order support")
    .bind(true)
    .bind("demo-alice")
    .bind(&now)
    .execute(&services.db_pool)
    .await
    .context("failed to insert demo group conversation")?;

    for (conversation_id, user_id) in [
        ("demo-direct", "demo-alice"),
        ("demo-direct", "demo-bob"),
        ("demo-group", "demo-alice"),
        ("demo-group", "demo-bob"),
        ("demo-group", "demo-carol"),
    ] {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO conversation_members (conversation_id, user_id, joined_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(&now)
        .execute(&services.db_pool)
        .await
        .with_context(|| format!("failed to add {user_id} to {conversation_id}"))?;
    }

    sqlx::query(
        r#"
        INSERT INTO messages (conversation_id, sender_id, content, is_read, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind("demo-direct")
    .bind("demo-alice")
    .bind("Hi Bob, is the order on its way?")
    .bind(false)
    .bind(&now)
    .execute(&services.db_pool)
    .await
    .context("failed to insert demo message")?;

    println!("Database seeded with demo data:");
    println!("- 3 users created");
    println!("- 2 conversations created");
    println!("- 1 message created");
    println!("Run 'dump-data' to see the inserted data");

    Ok(())
}
