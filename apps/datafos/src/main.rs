//! Datafos command-line tool
//!
//! Usage:
//!   datafos init
//!   datafos search --form 1 -p f_3=Red -p f_3_allreq=1 -p sort=-2 --json
//!   datafos render single --record 12
//!   datafos render preview --form 1 --template list
//!   datafos kml --form 1 --field 4

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use datafos::db::SqliteRecordStore;
use datafos::{Config, FormManager, RecordFilter};
use datafos_fields::RequestParams;
use datafos_template::TemplateKind;

#[derive(Parser, Debug)]
#[command(name = "datafos")]
#[command(about = "Custom record databases: search, render and export", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./datafos.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database URL, overriding the configuration
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database schema, optionally with an empty form
    Init {
        /// Name of a form to create
        #[arg(long)]
        form: Option<String>,

        /// New entries of the form need approval
        #[arg(long)]
        approval: bool,
    },
    /// Run an advanced search and print the matching entries
    Search {
        #[arg(long)]
        form: i64,

        /// Search parameter as name=value (f_<id>, u_fn, u_tags[], sort, order, page, perpage...)
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Print the result as JSON instead of the list template
        #[arg(long)]
        json: bool,
    },
    /// Render a template
    Render {
        #[command(subcommand)]
        target: RenderTarget,
    },
    /// Export the coordinates of a latlong field as KML
    Kml {
        #[arg(long)]
        form: i64,

        #[arg(long)]
        field: i64,

        /// Only this entry
        #[arg(long)]
        record: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
enum RenderTarget {
    /// One entry with the single template
    Single {
        #[arg(long)]
        record: i64,
    },
    /// The advanced search form
    Search {
        #[arg(long)]
        form: i64,
    },
    /// The add form, optionally filled with an entry's content
    Add {
        #[arg(long)]
        form: i64,

        #[arg(long)]
        record: Option<i64>,
    },
    /// A template with example content
    Preview {
        #[arg(long)]
        form: i64,

        /// list, single, asearch, add or rss
        #[arg(long, default_value = "single")]
        template: TemplateKind,

        /// Entry number used to vary the example content
        #[arg(long, default_value_t = 1)]
        record: i64,
    },
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {:?}", s))?;
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    let _guard = datafos::logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let store = SqliteRecordStore::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    let manager = FormManager::new(store, &config);

    match cli.command {
        Commands::Init { form, approval } => {
            if let Some(name) = form {
                let form = manager.create_form(&name, approval).await?;
                println!("Created form {} ({})", form.id, form.name);
            }
            println!("Database ready at {}", config.database.url);
        }
        Commands::Search { form, params, json } => {
            let request = RequestParams::from_pairs(params);
            let parsed = manager.parse_search_request(form, &request, None).await?;
            let result = manager
                .search(form, &parsed.criteria, parsed.sort, parsed.pagination, &RecordFilter::all())
                .await
                .context("Search failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", manager.render_list(form, &result.records).await?);
                eprintln!("{} of {} entries", result.records.len(), result.total_count);
            }
        }
        Commands::Render { target } => {
            let html = match target {
                RenderTarget::Single { record } => manager.render_single(record).await?,
                RenderTarget::Search { form } => {
                    manager
                        .render_search_form(form, &datafos_fields::CriteriaMap::new())
                        .await?
                }
                RenderTarget::Add { form, record } => {
                    manager
                        .render_add_form(form, record, &Default::default())
                        .await?
                }
                RenderTarget::Preview {
                    form,
                    template,
                    record,
                } => manager.render_preview(form, template, record).await?,
            };
            println!("{}", html);
        }
        Commands::Kml {
            form,
            field,
            record,
        } => {
            let kml = manager
                .export_kml(form, field, record)
                .await
                .context("KML export failed")?;
            print!("{}", kml);
        }
    }

    Ok(())
}
