//! CLI tool to inspect and apply schema migrations.
//!
//! Usage:
//!   cargo run --bin migrate -- up
//!   cargo run --bin migrate -- status
//!   cargo run --bin migrate -- down --id <migration-id>

use std::env;

use novelhub::config::Config;
use novelhub::db::DbPool;
use novelhub::migration::{self, MigrationError};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let Some(command) = args.get(1).map(String::as_str) else {
        print_usage();
        std::process::exit(1);
    };
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    let result = match command {
        "up" => up(&pool).await,
        "status" => status(&pool).await,
        "down" => {
            let Some(id) = parse_id_arg(&args) else {
                eprintln!("Error: --id is required");
                std::process::exit(1);
            };
            down(&pool, &id).await
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_id_arg(args: &[String]) -> Option<String> {
    let mut i = 2;
    while i < args.len() {
        if (args[i] == "--id" || args[i] == "-i") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

async fn up(pool: &DbPool) -> Result<(), MigrationError> {
    let report = migration::run_migrations(pool.connection()).await?;

    if report.applied.is_empty() {
        println!("Database is up to date.");
    } else {
        for id in &report.applied {
            println!("Applied {}", id);
        }
    }
    Ok(())
}

async fn status(pool: &DbPool) -> Result<(), MigrationError> {
    let statuses = migration::status(pool.connection(), &migration::migrations()).await?;

    println!();
    println!("{:<36} {:<28} {}", "MIGRATION", "APPLIED AT", "DESCRIPTION");
    println!("{}", "-".repeat(96));
    for entry in statuses {
        let applied = entry
            .applied
            .map(|a| a.applied_at.to_rfc3339())
            .unwrap_or_else(|| "pending".to_string());
        println!("{:<36} {:<28} {}", entry.id, applied, entry.description);
    }
    println!();
    Ok(())
}

async fn down(pool: &DbPool, id: &str) -> Result<(), MigrationError> {
    migration::rollback(pool.connection(), &migration::migrations(), id).await?;
    println!("Rolled back {}", id);
    Ok(())
}

fn print_usage() {
    eprintln!(
        r#"
Manage the Novelhub database schema

USAGE:
    migrate <COMMAND> [OPTIONS]

COMMANDS:
    up        Apply every pending migration in order
    status    List migrations and when they were applied
    down      Revert one applied migration and forget it
    help      Show this help message

OPTIONS:
    -i, --id <ID>    Migration id (down)

Roll back in reverse order: `down` only reverts the named migration.

ENVIRONMENT:
    RUST_ENV        development or production
    DATABASE_URL    PostgreSQL connection string
"#
    );
}
