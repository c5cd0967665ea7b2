use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;

use newsdesk::app::{build_http_client, App, Collaborators};
use newsdesk::config::Config;
use newsdesk::feed::{FetchService, NotificationBus, RetryPolicy};
use newsdesk::intent::SystemBrowser;
use newsdesk::scheduler::IntervalAlarm;
use newsdesk::settings::{store_setting, SettingKey, Settings};
use newsdesk::storage::{Database, DatabaseError};
use newsdesk::theme::Argb;
use newsdesk::ui;

/// Get the config directory path (~/.config/newsdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsdesk"))
}

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "Single-feed terminal news reader")]
struct Args {
    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,

    /// Config file to use instead of ~/.config/newsdesk/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Feed URL, overriding the config file
    #[arg(long, value_name = "URL")]
    feed: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the reader (default)
    Run,
    /// Print the archived articles and exit
    List {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Inspect or change list colours and the widget count
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Show every setting and its stored value
    List,
    /// Store a setting (colours as #RRGGBB, #AARRGGBB or 0xAARRGGBB)
    Set { key: String, value: String },
    /// Remove a stored setting so its default applies
    Unset { key: String },
}

/// Log to a file in the config directory; stdout belongs to the TUI.
fn init_logging(config_dir: &std::path::Path) -> Result<()> {
    let log_path = config_dir.join("newsdesk.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
            eprintln!(
                "Warning: could not restrict {} to user-only access: {}",
                config_dir.display(),
                e
            );
        }
    }

    init_logging(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if let Some(feed) = args.feed {
        config.feed_url = feed;
    }

    let db_path = config_dir.join("newsdesk.db");
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of newsdesk appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run_reader(db, config, config_dir).await,
        Command::List { json } => list_archive(&db, json).await,
        Command::Settings { action } => edit_settings(&db, action).await,
    }
}

async fn run_reader(db: Database, config: Config, config_dir: PathBuf) -> Result<()> {
    let client = build_http_client(config.request_timeout())?;
    let policy = RetryPolicy {
        timeout: config.request_timeout(),
        ..RetryPolicy::default()
    };

    let bus = NotificationBus::new();
    let (handle, service) = FetchService::spawn(
        client,
        config.feed_url.clone(),
        policy,
        bus.clone(),
        Some(db.clone()),
    );

    let collaborators = Collaborators {
        fetch: Box::new(handle.clone()),
        alarm: Box::new(IntervalAlarm::new(config.refresh_interval(), handle)),
        browser: Box::new(SystemBrowser),
    };

    let settings = Settings::load(&db).await.context("Failed to load settings")?;
    let archived = db
        .load_articles()
        .await
        .context("Failed to load archived articles")?;
    tracing::info!(
        feed = %config.feed_url,
        archived = archived.len(),
        "Starting reader"
    );

    let mut app = App::new(
        db,
        bus,
        collaborators,
        settings,
        config.share_attribution,
        config_dir.join("shared.txt"),
    );
    app.create(archived);

    let result = ui::run(&mut app).await;

    // An in-flight fetch has nobody left to deliver to.
    drop(app);
    service.abort();

    result?;
    println!("Goodbye!");
    Ok(())
}

async fn list_archive(db: &Database, json: bool) -> Result<()> {
    let articles = db.load_articles().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&articles)?);
        return Ok(());
    }
    if articles.is_empty() {
        println!("No archived articles yet.");
        return Ok(());
    }
    for article in &articles {
        let marker = if article.is_read() { " " } else { "*" };
        println!("{} {}  {}", marker, article.date, article.title);
        println!("    {}", article.url);
    }
    println!();
    println!(
        "{} articles, {} unread",
        articles.len(),
        articles.iter().filter(|a| !a.is_read()).count()
    );
    Ok(())
}

async fn edit_settings(db: &Database, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::List => {
            let settings = Settings::load(db).await?;
            for key in SettingKey::ALL {
                let shown = match settings.get(key) {
                    Some(v) if key.is_color() => Argb::from_setting(v).to_string(),
                    Some(v) => v.to_string(),
                    None => "(default)".to_string(),
                };
                println!("{:<24} {}", key, shown);
            }
        }
        SettingsAction::Set { key, value } => {
            let stored = store_setting(db, &key, &value).await?;
            println!("{} = {}", key, stored);
        }
        SettingsAction::Unset { key } => {
            let Some(setting) = SettingKey::from_name(&key) else {
                anyhow::bail!("Unknown setting '{}'", key);
            };
            if db.delete_preference(setting.as_str()).await? {
                println!("Removed {}", setting);
            } else {
                println!("{} was not set", setting);
            }
        }
    }
    Ok(())
}
