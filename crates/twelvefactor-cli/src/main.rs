use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tfx",
    about = "twelvefactor: run twelve-factor apps on container schedulers",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that an app manifest parses and is well-formed
    Validate {
        /// Path to the manifest TOML
        manifest: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Deploy a manifest to an in-memory ECS cluster and report its tasks.
    ///
    /// Runs the same scheduler used against real clusters, with an
    /// in-process backend standing in for ECS and the stack builder.
    Simulate {
        /// Path to the manifest TOML
        manifest: String,
        /// ECS scheduler config (TOML with `cluster = "..."`)
        #[arg(short, long)]
        config: Option<String>,
        /// Scale a process after deploy, as PROCESS=COUNT. Repeatable.
        /// The simulated cluster refuses counts above 10000.
        #[arg(short, long)]
        scale: Vec<String>,
        /// Restart the app after deploy and scaling
        #[arg(long)]
        restart: bool,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("twelvefactor=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { manifest, format } => {
            commands::validate::validate(&manifest, &format)
        }
        Commands::Simulate {
            manifest,
            config,
            scale,
            restart,
            format,
        } => {
            commands::simulate::simulate(&manifest, config.as_deref(), &scale, restart, &format)
                .await
        }
    }
}
