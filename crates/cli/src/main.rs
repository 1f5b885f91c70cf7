use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use tracing::debug;
use verdict_api::SdkConfig;
use verdict_engine::{ActionRuntime, DisputeLoader, StaticContractReader, placeholders, render_dispute};
use verdict_types::{DataContext, DisputeDetails, parse_ruling_id};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();
    let config_path = matches.get_one::<PathBuf>("config").cloned();

    match matches.subcommand() {
        Some(("render", sub)) => run_render(sub, config_path.as_deref()).await,
        Some(("dispute", sub)) => run_dispute(sub, config_path.as_deref()).await,
        Some(("placeholders", sub)) => run_placeholders(sub),
        Some(("vote-choice", sub)) => run_vote_choice(sub),
        _ => bail!("expected a subcommand; see `verdict --help`"),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    let template_arg = Arg::new("template")
        .long("template")
        .short('t')
        .required(true)
        .action(ArgAction::Set)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Path to the dispute template JSON");
    let contracts_arg = Arg::new("contracts")
        .long("contracts")
        .action(ArgAction::Set)
        .value_parser(clap::value_parser!(PathBuf))
        .help("YAML/JSON file with recorded contract call results and event logs");

    Command::new("verdict")
        .about("Render dispute templates from their data mappings")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Config file (defaults to <config dir>/verdict/config.yaml)"),
        )
        .subcommand(
            Command::new("render")
                .about("Run a template's mappings and print the rendered dispute")
                .arg(template_arg.clone())
                .arg(
                    Arg::new("mappings")
                        .long("mappings")
                        .short('m')
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Path to the data mappings (JSON or YAML)"),
                )
                .arg(
                    Arg::new("context")
                        .long("context")
                        .short('c')
                        .action(ArgAction::Append)
                        .value_name("KEY=VALUE")
                        .help("Initial context value; VALUE is read as JSON when it parses, else as text"),
                )
                .arg(contracts_arg.clone()),
        )
        .subcommand(
            Command::new("dispute")
                .about("Load a dispute from the subgraphs and print its rendered template")
                .arg(Arg::new("id").required(true).action(ArgAction::Set).help("Dispute id"))
                .arg(contracts_arg),
        )
        .subcommand(
            Command::new("placeholders")
                .about("List the placeholders a template references")
                .arg(template_arg.clone()),
        )
        .subcommand(
            Command::new("vote-choice")
                .about("Print the answer title for a ruling of a rendered dispute")
                .arg(template_arg)
                .arg(Arg::new("ruling").required(true).action(ArgAction::Set).help("Ruling as decimal or 0x-prefixed hex")),
        )
}

fn runtime_for(matches: &ArgMatches, config: &SdkConfig) -> Result<ActionRuntime> {
    let runtime = ActionRuntime::from_config(config)?;
    match matches.get_one::<PathBuf>("contracts") {
        Some(path) => Ok(runtime.with_contract_reader(Arc::new(StaticContractReader::from_file(path)?))),
        None => Ok(runtime),
    }
}

async fn run_render(matches: &ArgMatches, config_path: Option<&Path>) -> Result<()> {
    let config = SdkConfig::load(config_path)?;
    let template = read_file(matches, "template")?.context("template is required")?;
    let mappings = read_file(matches, "mappings")?;
    let mut context = DataContext::new();
    for entry in matches.get_many::<String>("context").into_iter().flatten() {
        let (key, value) = parse_context_entry(entry)?;
        context.insert(key, value);
    }
    debug!(context_keys = context.len(), has_mappings = mappings.is_some(), "rendering template");

    let runtime = runtime_for(matches, &config)?;
    let dispute = render_dispute(&template, mappings.as_deref(), context, &runtime).await?;
    print_dispute(&dispute)
}

async fn run_dispute(matches: &ArgMatches, config_path: Option<&Path>) -> Result<()> {
    let config = SdkConfig::load(config_path)?;
    let dispute_id = matches.get_one::<String>("id").context("dispute id is required")?;
    let loader = DisputeLoader::from_config(&config, runtime_for(matches, &config)?)?;
    let dispute = loader.get_dispute(dispute_id).await?;
    print_dispute(&dispute)
}

fn run_placeholders(matches: &ArgMatches) -> Result<()> {
    let template = read_file(matches, "template")?.context("template is required")?;
    let document: Value = serde_json::from_str(&template).context("template is not valid JSON")?;
    for path in placeholders(&document) {
        println!("{path}");
    }
    Ok(())
}

fn run_vote_choice(matches: &ArgMatches) -> Result<()> {
    let template = read_file(matches, "template")?.context("template is required")?;
    let dispute: DisputeDetails = serde_json::from_str(&template).context("template is not a rendered dispute")?;
    let raw_ruling = matches.get_one::<String>("ruling").context("ruling is required")?;
    let ruling = parse_ruling_id(raw_ruling).ok_or_else(|| anyhow!("invalid ruling '{raw_ruling}'"))?;
    println!("{}", dispute.vote_choice(ruling));
    Ok(())
}

fn read_file(matches: &ArgMatches, id: &str) -> Result<Option<String>> {
    let Some(path) = matches.get_one::<PathBuf>(id) else {
        return Ok(None);
    };
    fs::read_to_string(path)
        .map(Some)
        .with_context(|| format!("Failed to read {id} file: {}", path.display()))
}

fn parse_context_entry(entry: &str) -> Result<(String, Value)> {
    let (key, raw_value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("context entry '{entry}' must look like KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("context entry '{entry}' has an empty key");
    }
    let value = serde_json::from_str(raw_value).unwrap_or_else(|_| Value::String(raw_value.to_string()));
    Ok((key.to_string(), value))
}

fn print_dispute(dispute: &DisputeDetails) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(dispute)?);
    Ok(())
}
