use clap::Parser;
use log::{error, info};
use std::io::Write;
use std::path::PathBuf;
use streamlens::{KafkaMetadataSource, PatternConfig, SourceConfig, SourceError, SourceResult};

#[derive(Parser)]
#[command(name = "streamlens")]
#[command(about = "Extract Kafka topic metadata snapshots for a downstream catalog")]
#[command(version)]
struct Cli {
    /// YAML configuration file; when set, the connection flags below are
    /// ignored
    #[arg(long)]
    config: Option<PathBuf>,

    /// Kafka bootstrap servers
    #[arg(long, default_value = "localhost:9092")]
    bootstrap: String,

    /// Confluent-compatible schema registry URL
    #[arg(long)]
    registry_url: Option<String>,

    /// Topic allow pattern (repeatable)
    #[arg(long)]
    allow: Vec<String>,

    /// Topic deny pattern (repeatable)
    #[arg(long)]
    deny: Vec<String>,

    /// Platform instance qualifier for this cluster
    #[arg(long)]
    platform_instance: Option<String>,

    /// Environment tag stamped into URNs and browse paths
    #[arg(long, default_value = "PROD")]
    env: String,

    /// Where to write NDJSON records ("-" for stdout)
    #[arg(long, default_value = "-")]
    output: String,

    /// Print the run report as JSON after the records
    #[arg(long)]
    report_json: bool,
}

impl Cli {
    fn into_config(self) -> SourceResult<(SourceConfig, String, bool)> {
        let output = self.output.clone();
        let report_json = self.report_json;

        let config = match &self.config {
            Some(path) => SourceConfig::from_yaml_file(path)?,
            None => {
                let defaults = PatternConfig::default();
                SourceConfig {
                    bootstrap: self.bootstrap,
                    schema_registry_url: self.registry_url,
                    topic_patterns: PatternConfig {
                        allow: if self.allow.is_empty() {
                            defaults.allow
                        } else {
                            self.allow
                        },
                        deny: if self.deny.is_empty() {
                            defaults.deny
                        } else {
                            self.deny
                        },
                    },
                    platform_instance: self.platform_instance,
                    env: self.env,
                    ..Default::default()
                }
            }
        };

        Ok((config, output, report_json))
    }
}

async fn run(cli: Cli) -> SourceResult<()> {
    let (config, output, report_json) = cli.into_config()?;

    let mut source = KafkaMetadataSource::connect(config).await?;

    let mut out: Box<dyn Write> = if output == "-" {
        Box::new(std::io::stdout().lock())
    } else {
        Box::new(
            std::fs::File::create(&output)
                .map_err(|e| SourceError::io(e, format!("create output file {}", output)))?,
        )
    };

    while let Some(item) = source.next_item().await? {
        serde_json::to_writer(&mut out, &item)?;
        out.write_all(b"\n")
            .map_err(|e| SourceError::io(e, "write output record".to_string()))?;
    }
    out.flush()
        .map_err(|e| SourceError::io(e, "flush output".to_string()))?;

    let report = source.report();
    info!(
        "run complete: {} topics discovered, {} filtered, {} records emitted, {} warnings",
        report.topics_discovered,
        report.topics_filtered,
        report.records_emitted,
        report.warnings.len()
    );
    if report_json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("run aborted: {}", e);
        std::process::exit(1);
    }
}
