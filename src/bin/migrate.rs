use anyhow::{anyhow, Result};
use daily_poll_bot::database::connection::{mask_url, sqlite_path, DatabaseManager};
use sqlx::Row;
use std::env;
use std::io;
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/polls.db";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "reset" => reset_database().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

fn database_url() -> String {
    env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

async fn run_migrations() -> Result<()> {
    println!("🔧 Daily Poll Bot - Database Migration Tool");
    println!("============================================");

    let url = database_url();
    println!("📊 Database URL: {}", mask_url(&url));
    println!("🚀 Running database migrations...");

    let db = DatabaseManager::new(&url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    let result = db.run_migrations().await;
    db.close().await;

    match result {
        Ok(()) => {
            println!("✅ Migrations completed successfully!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");

    let url = database_url();
    println!("📊 Database URL: {}", mask_url(&url));

    let db = DatabaseManager::new(&url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match check_tables(&db).await {
        Ok(tables) if tables.is_empty() => {
            println!("⚠️  Database is empty");
            println!("💡 Try running 'migrate up' to create the schema");
        }
        Ok(tables) => {
            println!("✅ Database connection successful!");
            println!("📋 Found tables:");
            for (table, rows) in tables {
                println!("  • {table} ({rows} rows)");
            }
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
        }
    }

    db.close().await;
    Ok(())
}

async fn reset_database() -> Result<()> {
    let url = database_url();
    let Some(db_path) = sqlite_path(&url).map(str::to_string) else {
        return Err(anyhow!("Reset is only supported for SQLite database files"));
    };

    println!("⚠️  WARNING: This will delete ALL polls and votes in {}!", mask_url(&url));
    println!("🤔 Are you sure you want to continue? (yes/no)");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }

    if Path::new(&db_path).exists() {
        std::fs::remove_file(&db_path)?;
        println!("🗑️  Deleted database file: {db_path}");
    }

    println!("🔄 Recreating database schema...");
    run_migrations().await?;

    println!("✅ Database reset completed!");
    Ok(())
}

async fn check_tables(db: &DatabaseManager) -> Result<Vec<(String, i64)>> {
    let names: Vec<String> = sqlx::query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&db.pool)
    .await?
    .iter()
    .map(|row| row.try_get::<String, _>("name"))
    .collect::<Result<_, _>>()?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        // Names come from sqlite_master, not from user input
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{name}\""))
            .fetch_one(&db.pool)
            .await?;
        tables.push((name, count));
    }

    Ok(tables)
}

fn print_help() {
    println!("📊 Daily Poll Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Run database migrations (default)");
    println!("    check          Check database connection and list tables");
    println!("    reset          Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL   Database connection string (default: {DEFAULT_DATABASE_URL})");
    println!();
    println!("EXAMPLES:");
    println!("    migrate                    # Run migrations");
    println!("    migrate check              # Check database status");
    println!("    migrate reset              # Reset database (careful!)");
    println!();
}
