use lazyprisma_cli::{repl, AppConfig, Coordinator, SpinnerTicker};
use lazyprisma_core::cli::PrismaCli;
use lazyprisma_core::{get_status, require_workspace};
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--version" || arg == "-v") {
        println!("lazyprisma version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let project_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("failed to determine working directory: {err}");
            std::process::exit(1);
        }
    };

    let status = get_status(&project_dir).await;

    if !status.cli_available {
        eprintln!("Prisma CLI is not available!");
        eprintln!("Please install Prisma first:");
        eprintln!("  npm install -D prisma");
        std::process::exit(1);
    }

    if status.workspace.is_none() && ask_for_init() {
        println!("\nInitializing Prisma...");
        match PrismaCli::new(&project_dir).init().run_with_output().await {
            Ok(result) if result.success() => {
                println!("Prisma initialized successfully!");
                print!("{}", result.stdout);
            }
            Ok(result) => {
                eprintln!("prisma init failed with exit code {}", result.exit_code);
                eprint!("{}", result.combined_output());
                std::process::exit(1);
            }
            Err(err) => {
                eprintln!("failed to run prisma init: {err}");
                std::process::exit(1);
            }
        }
    }

    if let Err(err) = require_workspace(&project_dir) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    if let Err(err) = lazyprisma_db::register_builtin_drivers() {
        eprintln!("failed to register database drivers: {err}");
        std::process::exit(1);
    }

    if let Err(err) = AppConfig::ensure_config_file() {
        tracing::warn!(error = %err, "could not create config file");
    }
    let config = AppConfig::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "config file unreadable, using defaults");
        AppConfig::default()
    });

    let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
    let coordinator = Coordinator::new(&project_dir, config.clone(), events_tx.clone());
    let ticker = SpinnerTicker::start(coordinator.gate(), config.spinner_interval(), events_tx);

    coordinator.refresh();

    let result = repl::run(coordinator.clone(), events_rx).await;

    // Teardown: stop the ticker, kill Studio if still alive
    ticker.stop().await;
    coordinator.shutdown();

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn ask_for_init() -> bool {
    println!("No Prisma schema detected.");
    println!();
    println!("Would you like to initialize Prisma now?");
    println!("This will:");
    println!("  - Create prisma/schema.prisma");
    println!("  - Generate a .env file with DATABASE_URL");
    println!();
    print!("Initialize Prisma? [Y/n]: ");
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes")
}
