use std::path::PathBuf;

use clap::{Parser, Subcommand};

use heatgrid_render::OutputFormat;

mod commands;

use commands::QueryArgs;

#[derive(Parser)]
#[command(
    name = "heatgrid",
    about = "heatgrid — clustered heatmaps of Netdata Cloud metrics",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to heatgrid.toml (default: ./heatgrid.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the contexts matching --contexts-regex
    Contexts {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Run the pipeline and write the clustered heatmap.
    ///
    /// The format defaults to the output file's extension, or svg when
    /// writing to stdout.
    Heatmap {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format: svg, csv or json
        #[arg(short, long)]
        format: Option<OutputFormat>,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Serve the dashboard
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("heatgrid=info".parse()?)
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Contexts { query } => {
            let config = commands::load_config(config_path, &query)?;
            commands::contexts::contexts(&config, query.fixture.as_deref()).await
        }
        Commands::Heatmap {
            output,
            format,
            query,
        } => {
            let config = commands::load_config(config_path, &query)?;
            commands::heatmap::heatmap(&config, query.fixture.as_deref(), output.as_deref(), format)
                .await
        }
        Commands::Serve { port, query } => {
            let config = commands::load_config(config_path, &query)?;
            commands::serve::serve(&config, query.fixture.as_deref(), port).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_heatmap_overrides() {
        let cli = Cli::try_parse_from([
            "heatgrid",
            "--config",
            "custom.toml",
            "heatmap",
            "-o",
            "out.csv",
            "--contexts-regex",
            "system",
            "--after",
            "-300",
            "--n-clusters",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Heatmap {
                output,
                format,
                query,
            } => {
                assert_eq!(output, Some(PathBuf::from("out.csv")));
                assert_eq!(format, None);
                assert_eq!(query.contexts_regex.as_deref(), Some("system"));
                assert_eq!(query.after, Some(-300));
                assert_eq!(query.n_clusters, Some(4));
            }
            _ => panic!("expected heatmap"),
        }
    }

    #[test]
    fn parses_format() {
        let cli = Cli::try_parse_from(["heatgrid", "heatmap", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Heatmap { format, .. } => assert_eq!(format, Some(OutputFormat::Json)),
            _ => panic!("expected heatmap"),
        }
        assert!(Cli::try_parse_from(["heatgrid", "heatmap", "--format", "png"]).is_err());
    }

    #[test]
    fn figure_flags_are_bounded() {
        assert!(Cli::try_parse_from(["heatgrid", "heatmap", "--fig-h", "4294967295"]).is_err());
        assert!(Cli::try_parse_from(["heatgrid", "heatmap", "--fig-w", "0"]).is_err());
        assert!(Cli::try_parse_from(["heatgrid", "heatmap", "--fig-h", "40"]).is_ok());
    }

    #[test]
    fn serve_default_port() {
        let cli = Cli::try_parse_from(["heatgrid", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { port, .. } => assert_eq!(port, 8080),
            _ => panic!("expected serve"),
        }
    }
}
