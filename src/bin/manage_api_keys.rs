//! CLI tool to manage API keys.
//!
//! Usage:
//!   cargo run --bin manage-api-keys -- create --user <user-id> --name "CI" [--expires-in 30d]
//!   cargo run --bin manage-api-keys -- list --user <user-id>
//!   cargo run --bin manage-api-keys -- revoke --id <key-id>

use std::env;

use novelhub::config::Config;
use novelhub::db::DbPool;
use novelhub::models::ApiKeyListItem;
use novelhub::services::api_key;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = args[1].as_str();
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

    match command {
        "create" => {
            let user_id = required_id(&args, "--user", "-u");
            let Some(name) = flag_value(&args, "--name", "-n") else {
                eprintln!("Error: --name is required");
                std::process::exit(1);
            };
            let expires_in = flag_value(&args, "--expires-in", "-e");
            create_key(&pool, user_id, &name, expires_in.as_deref()).await;
        }
        "list" | "ls" => {
            let user_id = required_id(&args, "--user", "-u");
            list_keys(&pool, user_id).await;
        }
        "revoke" => {
            let id = required_id(&args, "--id", "-i");
            revoke_key(&pool, id).await;
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn flag_value(args: &[String], long: &str, short: &str) -> Option<String> {
    args.iter()
        .skip(2)
        .position(|a| a == long || a == short)
        .and_then(|i| args.get(i + 3))
        .cloned()
}

fn required_id(args: &[String], long: &str, short: &str) -> i32 {
    let Some(raw) = flag_value(args, long, short) else {
        eprintln!("Error: {} is required", long);
        std::process::exit(1);
    };
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => id,
        _ => {
            eprintln!("Error: {} must be a positive number, got '{}'", long, raw);
            std::process::exit(1);
        }
    }
}

async fn create_key(pool: &DbPool, user_id: i32, name: &str, expires_in: Option<&str>) {
    let (full_key, key) = match api_key::create_key(pool, user_id, name, expires_in).await {
        Ok(created) => created,
        Err(e) => {
            eprintln!("Error creating key: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("API key created for user {}", key.user_id);
    println!("  ID:      {}", key.id);
    println!("  Name:    {}", key.name);
    println!("  Prefix:  {}", key.key_prefix);
    if let Some(expires_at) = key.expires_at {
        println!("  Expires: {}", expires_at.to_rfc3339());
    }
    println!();
    println!("  Key:     {}", full_key);
    println!();
    println!("Store this key now. It cannot be shown again.");
}

async fn list_keys(pool: &DbPool, user_id: i32) {
    let keys = match api_key::list_keys(pool, user_id).await {
        Ok(k) => k,
        Err(e) => {
            eprintln!("Error listing keys: {}", e);
            std::process::exit(1);
        }
    };

    if keys.is_empty() {
        println!("No API keys found for user {}.", user_id);
        return;
    }

    println!();
    println!(
        "{:<8} {:<12} {:<20} {:<26} {:<10}",
        "ID", "PREFIX", "NAME", "LAST USED", "STATUS"
    );
    println!("{}", "-".repeat(78));

    for key in keys {
        let item = ApiKeyListItem::from(key);
        let status = if item.is_revoked { "revoked" } else { "active" };

        let name = if item.name.chars().count() > 18 {
            format!("{}...", item.name.chars().take(15).collect::<String>())
        } else {
            item.name.clone()
        };

        println!(
            "{:<8} {:<12} {:<20} {:<26} {:<10}",
            item.id,
            item.key_prefix,
            name,
            item.last_used_at.as_deref().unwrap_or("never"),
            status
        );
    }
    println!();
}

async fn revoke_key(pool: &DbPool, id: i32) {
    match api_key::revoke_key(pool, id).await {
        Ok(true) => {
            println!("API key {} revoked successfully.", id);
        }
        Ok(false) => {
            eprintln!("API key {} not found or already revoked.", id);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error revoking key: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        r#"
Manage Novelhub API keys

USAGE:
    manage-api-keys <COMMAND> [OPTIONS]

COMMANDS:
    create    Create a key for a user
    list      List a user's keys
    revoke    Revoke a key
    help      Show this help message

OPTIONS:
    -u, --user <ID>            User id (create, list)
    -n, --name <NAME>          Key name (create)
    -e, --expires-in <DUR>     Expiration, e.g. 30d, 12h, 1y (create)
    -i, --id <ID>              Key id (revoke)

ENVIRONMENT:
    RUST_ENV        development or production
    DATABASE_URL    PostgreSQL connection string
"#
    );
}
