//! Maintenance tool for the registrations database.
//!
//! Only needs `DATABASE_URL`; the bot token is not required.

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

use wolt_checker_bot::config::Config;
use wolt_checker_bot::database::connection::DatabaseManager;
use wolt_checker_bot::database::models::Registration;

const USAGE: &str = "\
Wolt Checker Bot database tool

USAGE:
    migrate [ACTION]

ACTIONS:
    up, migrate          Apply pending migrations (default)
    check                List tables and count active registrations
    history <user-id>    Print every registration of one Telegram user
    reset [--yes]        Delete the SQLite file and migrate again
    help                 Print this text

ENVIRONMENT:
    DATABASE_URL         SQLite URL (default: sqlite:./db/wolt-checker.db)
";

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Migrate,
    Check,
    History(i64),
    Reset { confirmed: bool },
    Help,
}

impl Action {
    fn parse(args: &[String]) -> Result<Self> {
        let mut args = args.iter().map(String::as_str);
        let action = match args.next() {
            None | Some("up") | Some("migrate") => Action::Migrate,
            Some("check") => Action::Check,
            Some("history") => {
                let raw = args.next().context("history needs a Telegram user id")?;
                let user_id = raw
                    .parse()
                    .with_context(|| format!("'{raw}' is not a user id"))?;
                Action::History(user_id)
            }
            Some("reset") => Action::Reset {
                confirmed: args.next() == Some("--yes"),
            },
            Some("help") | Some("-h") | Some("--help") => Action::Help,
            Some(other) => bail!("unknown action '{other}'"),
        };
        Ok(action)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let action = match Action::parse(&args) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("error: {e:#}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let url = Config::database_url_from_env();
    match action {
        Action::Help => {
            print!("{USAGE}");
            Ok(())
        }
        Action::Migrate => migrate(&url).await,
        Action::Check => check(&url).await,
        Action::History(user_id) => history(&url, user_id).await,
        Action::Reset { confirmed } => reset(&url, confirmed).await,
    }
}

async fn open(url: &str) -> Result<DatabaseManager> {
    println!("database: {}", display_url(url));
    DatabaseManager::new(url)
        .await
        .with_context(|| format!("cannot open {}", display_url(url)))
}

async fn migrate(url: &str) -> Result<()> {
    if let Some(dir) = sqlite_file(url).and_then(|file| file.parent()) {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
    }

    let db = open(url).await?;
    db.run_migrations().await.context("migration failed")?;
    println!("schema is up to date");
    Ok(())
}

async fn check(url: &str) -> Result<()> {
    let db = open(url).await?;

    let tables = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(&db.pool)
    .await
    .context("cannot list tables")?;

    println!("tables: {}", tables.join(", "));
    match Registration::count_active(&db.pool).await {
        Ok(count) => println!("active registrations: {count}"),
        Err(e) => println!("registrations table unavailable ({e}); run `migrate up`"),
    }
    Ok(())
}

async fn history(url: &str, user_id: i64) -> Result<()> {
    let db = open(url).await?;
    let rows = Registration::find_by_user(&db.pool, user_id).await?;

    if rows.is_empty() {
        println!("user {user_id} has no registrations");
        return Ok(());
    }

    for row in rows {
        match (row.reason(), row.removed_at.as_deref()) {
            (Some(reason), Some(at)) => {
                println!("{}  {}  removed {} ({})", row.registered_at, row.slug, at, reason)
            }
            _ => println!("{}  {}  active", row.registered_at, row.slug),
        }
    }
    Ok(())
}

async fn reset(url: &str, confirmed: bool) -> Result<()> {
    let Some(file) = sqlite_file(url) else {
        bail!("reset only works on SQLite file databases");
    };

    if !confirmed && !ask(&format!("Delete {} and every registration in it?", file.display()))? {
        println!("nothing deleted");
        return Ok(());
    }

    // WAL mode leaves side files next to the database.
    for suffix in ["", "-wal", "-shm"] {
        let path = format!("{}{}", file.display(), suffix);
        if Path::new(&path).exists() {
            std::fs::remove_file(&path).with_context(|| format!("cannot delete {path}"))?;
        }
    }

    migrate(url).await
}

fn ask(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Path of the database file for `sqlite:` URLs, `None` for in-memory ones.
fn sqlite_file(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path))
}

/// Only the file name, so logs do not reveal directory layout.
fn display_url(url: &str) -> String {
    match sqlite_file(url).and_then(|file| file.file_name()) {
        Some(name) => format!("sqlite:.../{}", name.to_string_lossy()),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Action> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Action::parse(&args)
    }

    #[test]
    fn test_default_action_is_migrate() {
        assert_eq!(parse(&[]).unwrap(), Action::Migrate);
        assert_eq!(parse(&["up"]).unwrap(), Action::Migrate);
    }

    #[test]
    fn test_history_needs_numeric_user() {
        assert_eq!(parse(&["history", "12345"]).unwrap(), Action::History(12345));
        assert!(parse(&["history"]).is_err());
        assert!(parse(&["history", "bob"]).is_err());
    }

    #[test]
    fn test_reset_confirmation_flag() {
        assert_eq!(parse(&["reset"]).unwrap(), Action::Reset { confirmed: false });
        assert_eq!(parse(&["reset", "--yes"]).unwrap(), Action::Reset { confirmed: true });
        assert!(parse(&["drop"]).is_err());
    }

    #[test]
    fn test_sqlite_file_paths() {
        assert_eq!(sqlite_file("sqlite:./db/x.db"), Some(Path::new("./db/x.db")));
        assert_eq!(sqlite_file("sqlite:///tmp/x.db?mode=rwc"), Some(Path::new("/tmp/x.db")));
        assert_eq!(sqlite_file("sqlite::memory:"), None);
        assert_eq!(sqlite_file("postgres://host/db"), None);
        assert_eq!(display_url("sqlite:./db/wolt-checker.db"), "sqlite:.../wolt-checker.db");
    }
}
