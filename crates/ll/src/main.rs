use clap::{Parser, Subcommand};
use ll_core::config::{ConfigError, LifelineConfig};
use ll_core::error::AuthError;
use ll_core::types::{
    Actor, Category, CreateRequestInput, Location, Priority, Profile, RegisterInput, Role,
};
use ll_core::{Lifeline, LifelineError, RequestContext};
use ll_db::DbStore;
use ll_db::schema;
use ll_events::bus::EventBus;
use ll_events::types::EventSource;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lifeline", about = "Emergency request lifecycle service")]
struct Cli {
    /// Path to a TOML config file. Defaults to ./lifeline.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the OpenAPI document.
    Openapi,
    /// Create or upgrade the database schema.
    Migrate,
    /// Load demo accounts and requests.
    Seed {
        #[arg(long, default_value = "lifeline-demo")]
        password: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lifeline(#[from] LifelineError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match LifelineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "lifeline exited with an error");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &LifelineConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command, mut config: LifelineConfig) -> Result<(), CliError> {
    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            ensure_parent(&config.db_path)?;
            schema::open_and_migrate(&config.db_path, config.busy_timeout_ms)
                .map_err(LifelineError::store)?;
            let addr = SocketAddr::new(config.bind, config.port);
            let state = ll_serve::AppState::from_config(&config);
            ll_serve::serve(state, addr).await?;
        }
        Command::Openapi => {
            println!("{}", ll_serve::openapi::generate_spec());
        }
        Command::Migrate => {
            ensure_parent(&config.db_path)?;
            schema::open_and_migrate(&config.db_path, config.busy_timeout_ms)
                .map_err(LifelineError::store)?;
            tracing::info!(db = %config.db_path.display(), "schema up to date");
        }
        Command::Seed { password } => {
            ensure_parent(&config.db_path)?;
            let conn = schema::open_and_migrate(&config.db_path, config.busy_timeout_ms)
                .map_err(LifelineError::store)?;
            let lifeline = Lifeline::new(DbStore::new(conn), EventBus::new(config.event_capacity));
            seed(&lifeline, &password)?;
        }
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

const DEMO_ACCOUNTS: [(&str, &str, Role, (f64, f64)); 4] = [
    ("Nadia Islam", "admin@lifeline.example", Role::NgoAdmin, (23.7806, 90.4070)),
    ("Rafi Hasan", "rafi@lifeline.example", Role::Volunteer, (23.8103, 90.4125)),
    ("Tania Akter", "tania@lifeline.example", Role::Volunteer, (24.8949, 91.8687)),
    ("Amina Begum", "amina@lifeline.example", Role::Victim, (23.8223, 90.3654)),
];

fn seed(lifeline: &Lifeline<DbStore>, password: &str) -> Result<(), LifelineError> {
    let ctx = RequestContext::new(EventSource::Seed, None);
    let mut victim: Option<Profile> = None;
    for (name, email, role, (latitude, longitude)) in DEMO_ACCOUNTS {
        let registered = lifeline.sessions().register(
            &ctx,
            RegisterInput {
                full_name: name.to_string(),
                email: email.to_string(),
                phone: Some("+8801700000000".to_string()),
                password: password.to_string(),
                role: Some(role),
                latitude: Some(latitude),
                longitude: Some(longitude),
            },
        );
        match registered {
            Ok(profile) => {
                tracing::info!(%email, role = %role, "seeded account");
                if role == Role::Victim {
                    victim = Some(profile);
                }
            }
            Err(LifelineError::Auth(AuthError::EmailTaken)) => {
                tracing::info!(%email, "account already present");
            }
            Err(err) => return Err(err),
        }
    }

    // Sample requests only accompany a freshly created victim account.
    let Some(victim) = victim else {
        return Ok(());
    };
    let actor: Actor = victim.actor();
    let samples = [
        (
            "Family stranded on rooftop",
            "Five people including two children, water still rising",
            Category::Rescue,
            Priority::Critical,
            5,
        ),
        (
            "Insulin needed",
            "Diabetic patient, supply ran out two days ago",
            Category::Medical,
            Priority::High,
            1,
        ),
        (
            "Drinking water for shelter",
            "Community school sheltering about forty people",
            Category::FoodSupplies,
            Priority::Medium,
            40,
        ),
    ];
    for (title, description, category, priority, people) in samples {
        let request = lifeline.requests().create(
            &ctx,
            &actor,
            CreateRequestInput {
                title: title.to_string(),
                description: description.to_string(),
                category,
                priority: Some(priority),
                people_affected: Some(people),
                location: Location {
                    address: "Mirpur, Dhaka".to_string(),
                    latitude: victim.latitude,
                    longitude: victim.longitude,
                    accuracy_m: Some(25.0),
                    captured_at: None,
                },
            },
        )?;
        tracing::info!(request_id = %request.id, %title, "seeded request");
    }
    Ok(())
}
