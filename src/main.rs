use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use static_blog::config::Config;
use static_blog::generator::{generate, GenerateOptions};
use static_blog::server::serve;

#[derive(Parser)]
#[command(name = "static-blog")]
#[command(about = "Markdown blog front end and static post generator", long_about = None)]
struct Cli {
    /// Config file (defaults to ./blog.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the blog
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (overrides PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate one static HTML page per markdown post
    #[command(alias = "g")]
    Generate {
        /// Directory of markdown sources
        #[arg(long)]
        posts_dir: Option<PathBuf>,

        /// HTML template with {{title}}, {{content}}, ... placeholders
        #[arg(long)]
        template: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        Commands::Generate {
            posts_dir,
            template,
            output,
        } => {
            let options = GenerateOptions {
                posts_dir: posts_dir.unwrap_or_else(|| config.posts_dir()),
                template_path: template.unwrap_or_else(|| config.template_path()),
                output_dir: output.unwrap_or_else(|| config.output_dir.clone()),
            };
            info!("Generating posts from {}", options.posts_dir.display());
            let report = generate(&options).await?;
            println!(
                "Generated {} pages in {}",
                report.pages.len(),
                options.output_dir.display()
            );
        }
    }

    Ok(())
}
