use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use examforge::cli::commands::{chunk, config, generate, health};
use examforge::types::{BloomQuota, DifficultyQuota, TypeQuota};

#[derive(Parser)]
#[command(name = "examforge")]
#[command(version, about = "AI-driven exam question generation from course materials")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate exam questions from a material file
    Generate {
        #[arg(long, short, help = "Material file (markdown or plain text)")]
        file: PathBuf,
        #[arg(long, short, help = "Course name")]
        course: String,
        #[arg(long, short, help = "Material name (default: file stem)")]
        material: Option<String>,
        #[arg(long, short, default_value = "1", help = "Unit number")]
        unit: u32,

        #[arg(long, default_value = "0", help = "EASY questions to generate")]
        easy: u32,
        #[arg(long, default_value = "0", help = "MEDIUM questions to generate")]
        medium: u32,
        #[arg(long, default_value = "0", help = "HARD questions to generate")]
        hard: u32,

        #[arg(long, default_value = "0", help = "REMEMBER-level questions")]
        remember: u32,
        #[arg(long, default_value = "0", help = "UNDERSTAND-level questions")]
        understand: u32,
        #[arg(long, default_value = "0", help = "APPLY-level questions")]
        apply: u32,
        #[arg(long, default_value = "0", help = "ANALYZE-level questions")]
        analyze: u32,
        #[arg(long, default_value = "0", help = "EVALUATE-level questions")]
        evaluate: u32,
        #[arg(long, default_value = "0", help = "CREATE-level questions")]
        create: u32,

        #[arg(long, default_value = "0", help = "DIRECT questions")]
        direct: u32,
        #[arg(long, default_value = "0", help = "INDIRECT questions")]
        indirect: u32,
        #[arg(long, default_value = "0", help = "SCENARIO_BASED questions")]
        scenario: u32,
        #[arg(long, default_value = "0", help = "PROBLEM_BASED questions")]
        problem: u32,

        #[arg(long, help = "Backend override: ollama, gemini")]
        provider: Option<String>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
        #[arg(long, short, help = "Write the JSON report here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Preview how a material file splits into chunks
    Chunk {
        #[arg(long, short, help = "Material file (markdown or plain text)")]
        file: PathBuf,
        #[arg(long, default_value = "0", help = "EASY count for distribution preview")]
        easy: u32,
        #[arg(long, default_value = "0", help = "MEDIUM count for distribution preview")]
        medium: u32,
        #[arg(long, default_value = "0", help = "HARD count for distribution preview")]
        hard: u32,
    },

    /// Check that the configured backend is reachable
    Health {
        #[arg(long, help = "Backend override: ollama, gemini")]
        provider: Option<String>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the merged effective configuration
    Show {
        #[arg(short = 'f', long, default_value = "toml", help = "Output format: toml, json")]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Create a starter configuration file
    Init {
        #[arg(long, short, help = "Create the global config instead of ./examforge.toml")]
        global: bool,
        #[arg(long, help = "Overwrite an existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mExamForge encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        eprintln!("\n\x1b[33mPlease report this issue at:\x1b[0m");
        eprintln!("  https://github.com/examforge/examforge/issues");
        eprintln!();

        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            file,
            course,
            material,
            unit,
            easy,
            medium,
            hard,
            remember,
            understand,
            apply,
            analyze,
            evaluate,
            create,
            direct,
            indirect,
            scenario,
            problem,
            provider,
            model,
            output,
        } => {
            let options = generate::GenerateOptions {
                file,
                course,
                material,
                unit,
                difficulty: DifficultyQuota::new(easy, medium, hard),
                bloom: BloomQuota {
                    remember,
                    understand,
                    apply,
                    analyze,
                    evaluate,
                    create,
                },
                question_type: TypeQuota {
                    direct,
                    indirect,
                    scenario_based: scenario,
                    problem_based: problem,
                },
                provider,
                model,
                output,
            };
            let rt = Runtime::new()?;
            rt.block_on(generate::run(options))?;
        }
        Commands::Chunk {
            file,
            easy,
            medium,
            hard,
        } => {
            chunk::run(chunk::ChunkOptions {
                file,
                difficulty: DifficultyQuota::new(easy, medium, hard),
            })?;
        }
        Commands::Health { provider, model } => {
            let rt = Runtime::new()?;
            rt.block_on(health::run(provider, model))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => config::show(&format)?,
            ConfigAction::Path => config::path()?,
            ConfigAction::Init { global, force } => config::init(global, force)?,
        },
    }

    Ok(())
}
