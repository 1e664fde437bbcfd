use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use campusd::auth::hash_secret;
use campusd::config::ServerConfig;
use campusd::server::{AppState, create_router};
use campusd::store::{SqliteStore, seed_sample_data};
use campusd::types::{Role, User};

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

fn generate_password() -> String {
    let bytes: [u8; 12] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Parser)]
#[command(name = "campusd")]
#[command(about = "A campus resource information server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database, admin account, and sample data)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Password for the admin account (generated if not given)
        #[arg(long)]
        admin_password: Option<String>,

        /// Skip seeding sample catalog data
        #[arg(long)]
        no_seed: bool,
    },
}

fn run_init(data_dir: String, admin_password: Option<String>, no_seed: bool) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: data_dir.into(),
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let password_file = config.admin_password_path();

    if store.has_admin_user()? {
        bail!(
            "Server already initialized. Admin password file at: {}",
            password_file.display()
        );
    }

    let password = admin_password.unwrap_or_else(generate_password);
    let now = Utc::now();
    let admin = User {
        id: Uuid::new_v4().to_string(),
        student_id: "admin".to_string(),
        name: "Administrator".to_string(),
        password_hash: hash_secret(&password)?,
        role: Role::Admin,
        created_at: now,
        updated_at: now,
    };
    store.create_user(&admin)?;

    fs::write(&password_file, &password)?;

    #[cfg(unix)]
    set_restrictive_permissions(&password_file);

    if !no_seed {
        seed_sample_data(&store)?;
    }

    println!();
    println!("========================================");
    println!("Admin account created (student_id: admin)");
    println!();
    println!("  Password: {password}");
    println!();
    println!("Password also written to: {}", password_file.display());
    println!("========================================");
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("campusd=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                admin_password,
                no_seed,
            } => {
                run_init(data_dir, admin_password, no_seed)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
            };

            if !config.db_path().exists() {
                bail!(
                    "Server not initialized. Run 'campusd admin init' first to create the database and admin account."
                );
            }

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;
            if !store.has_admin_user()? {
                bail!(
                    "Server not initialized. Run 'campusd admin init' first to create the database and admin account."
                );
            }

            let state = Arc::new(AppState {
                store: Arc::new(store),
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
