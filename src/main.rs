//! ToolBox command-line front end.

use anyhow::{Context, Result};
use std::sync::Arc;
use toolbox::cli::{params_from_pairs, resolve_connection, Cli, Command, OutputFormat};
use toolbox::config::Config;
use toolbox::db::{QueryExecutor, Row};
use toolbox::error::ToolboxError;
use toolbox::files::{read_txt, write_json, TextSchema};
use toolbox::logging::{self, RecordingReporter};
use toolbox::strings::capitalize;
use tracing::{error, info};

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ToolboxError>() {
            Some(toolbox_error) => error!("{}: {:#}", toolbox_error.category(), e),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();

    match cli.command {
        Command::Query {
            sql,
            url,
            connection,
            params,
            close_after_query,
            format,
        } => {
            info!("Loading config from: {}", config_path.display());
            let config = Config::load_from_file(&config_path)?;
            let connection = resolve_connection(
                url.as_deref(),
                connection.as_deref(),
                close_after_query,
                &config,
            )?;
            info!("Connection: {}", connection.display_string());

            // try_query returns every failure, so the reporter only absorbs the
            // construction-time copy instead of logging it twice.
            let mut executor = QueryExecutor::with_reporter(
                &connection.url,
                connection.policy,
                Arc::new(RecordingReporter::new()),
            );
            let rows = executor.try_query(&sql, params_from_pairs(&params).as_ref())?;
            executor.close()?;

            print_rows(&rows, format)?;
        }
        Command::TxtToJson {
            input,
            output,
            columns,
            separator,
        } => {
            let schema: TextSchema = columns.parse()?;
            let records: Vec<serde_json::Value> = read_txt(&input, &separator, &schema)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            write_json(&records, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                "Wrote {} records from {} to {}",
                records.len(),
                input.display(),
                output.display()
            );
        }
        Command::Capitalize { text } => {
            println!("{}", capitalize(&text));
        }
    }

    Ok(())
}

fn print_rows(rows: &[Row], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
        OutputFormat::Table => {
            if let Some(first) = rows.first() {
                println!("{}", first.columns().collect::<Vec<_>>().join("\t"));
            }
            for row in rows {
                println!("{}", row.values().collect::<Vec<_>>().join("\t"));
            }
        }
    }
    Ok(())
}
