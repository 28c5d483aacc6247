use std::io::{BufRead, BufReader};
use std::sync::Arc;

use cookiepool::database::models::AccountDbModel;
use cookiepool::database::repositories::{AccountRepository, SqlxAccountRepository};
use cookiepool::database::{init_pool, init_write_pool, run_migrations};
use pool_sites::supported_sites;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }

    let positional: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with('-')).collect();
    let (site, path) = match positional.as_slice() {
        [site, path] => (site.as_str(), path.as_str()),
        _ => {
            print_help();
            anyhow::bail!("expected exactly two arguments: <site> <file>");
        }
    };

    if !supported_sites().iter().any(|s| *s == site) {
        anyhow::bail!(
            "unknown site '{}' (supported: {})",
            site,
            supported_sites().join(", ")
        );
    }

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:cookiepool.db?mode=rwc".to_string());

    let pool = init_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let write_pool = init_write_pool(&database_url).await?;
    let accounts = Arc::new(SqlxAccountRepository::new(pool, write_pool));

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((username, password)) = split_credential(line) else {
            eprintln!("line {}: not 'username:password', skipping", line_no + 1);
            skipped += 1;
            continue;
        };

        let account = AccountDbModel::new(site, username, password);
        accounts.upsert(&account).await?;
        imported += 1;
    }

    println!("Imported {} account(s) for '{}' ({} skipped)", imported, site, skipped);
    Ok(())
}

/// Split one roster line into (username, password).
///
/// Accepts "username:password" and the legacy "username----password" form.
fn split_credential(line: &str) -> Option<(&str, &str)> {
    let (username, password) = line
        .split_once("----")
        .or_else(|| line.split_once(':'))?;
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return None;
    }
    Some((username, password))
}

fn print_help() {
    println!("cookiepool-import - Load account credentials into the roster");
    println!();
    println!("Usage:");
    println!("  cookiepool-import <site> <file>");
    println!();
    println!("The file holds one credential per line, 'username:password' or");
    println!("'username----password'. Blank lines and lines starting with '#'");
    println!("are ignored. Existing accounts get their password replaced.");
    println!();
    println!("Environment variables:");
    println!("  DATABASE_URL=sqlite:cookiepool.db?mode=rwc");
}
