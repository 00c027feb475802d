use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use nodegate_core::GateConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "nodegate",
    about = "nodegate: scheduler ownership and pod projection diagnostics",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to nodegate.toml (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which scheduler may consider each node.
    ///
    /// The file holds one node object or an array of node objects as
    /// returned by the cluster API.
    Node {
        /// Node snapshot file (JSON)
        path: PathBuf,
    },
    /// Show the projected state of each pod
    Pod {
        /// Pod snapshot file (JSON)
        path: PathBuf,
    },
    /// Build the annotations a task's pod would be launched with
    Annotate {
        /// Job snapshot file (JSON)
        #[arg(long)]
        job: PathBuf,
        /// Task snapshot file (JSON)
        #[arg(long)]
        task: PathBuf,
        /// Raw container info payload to embed
        #[arg(long)]
        container_info: Option<PathBuf>,
        /// Leave out the job descriptor regardless of config
        #[arg(long)]
        no_job_descriptor: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nodegate=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GateConfig::from_file(path)?,
        None => GateConfig::default(),
    };

    let output = match cli.command {
        Commands::Node { path } => commands::node::run(&config, &path, cli.format)?,
        Commands::Pod { path } => commands::pod::run(&path, cli.format)?,
        Commands::Annotate {
            job,
            task,
            container_info,
            no_job_descriptor,
        } => commands::annotate::run(
            &config,
            &job,
            &task,
            container_info.as_deref(),
            no_job_descriptor,
            cli.format,
        )?,
    };

    println!("{output}");
    Ok(())
}
