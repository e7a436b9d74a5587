use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use qbind_core::Message;
use qbind_decode::{decode, render_json, ErrorBody, PathFilter, QueryValues};
use qbind_schema::{Cardinality, FieldDescriptor, MessageDescriptor, Registry};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "qbindctl", version, about = "Bind URL query strings into schema-typed messages")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a query string into a message and print it
    Decode {
        /// Schema file (.yaml/.yml or .json)
        #[arg(long = "schema", env = "QBIND_SCHEMA")]
        schema: PathBuf,
        /// Full name of the root message type, e.g. "library.ListBooksRequest"
        #[arg(long = "type")]
        type_name: String,
        /// Dot-path prefix to leave alone (repeatable), e.g. fields bound from the URL path
        #[arg(long = "filter")]
        filter: Vec<String>,
        /// Query string, with or without the leading '?'
        query: String,
    },
    /// List message types, or the fields of one type
    Schema {
        #[arg(long = "schema", env = "QBIND_SCHEMA")]
        schema: PathBuf,
        /// Message type to describe
        type_name: Option<String>,
    },
    /// Validate a schema file and report unresolved type references
    Check {
        #[arg(long = "schema", env = "QBIND_SCHEMA")]
        schema: PathBuf,
    },
}

fn init_tracing() {
    let env = std::env::var("QBIND_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn load(path: &Path) -> Result<Registry> {
    let reg = Registry::load(path)?;
    info!(schema = %path.display(), messages = reg.message_names().len(), enums = reg.enum_names().len(), "schema loaded");
    Ok(reg)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { schema, type_name, filter, query } => {
            let reg = load(&schema)?;
            let filter = PathFilter::from_paths(&filter);
            let values = QueryValues::parse(&query);
            info!(type_name = %type_name, params = values.len(), filters = filter.len(), "decode invoked");
            match decode(&values, &reg, &type_name, &filter) {
                Ok(msg) => print_message(&msg, &reg, cli.output)?,
                Err(e) => {
                    warn!(error = %e, kind = e.kind().as_str(), "decode rejected");
                    match cli.output {
                        Output::Human => eprintln!("decode error: {}", e),
                        Output::Json => println!("{}", serde_json::to_string_pretty(&ErrorBody::from(&e))?),
                    }
                    std::process::exit(1);
                }
            }
        }
        Commands::Schema { schema, type_name } => {
            let reg = load(&schema)?;
            match type_name {
                None => match cli.output {
                    Output::Human => {
                        for name in reg.message_names() { println!("message {}", name); }
                        for name in reg.enum_names() { println!("enum    {}", name); }
                    }
                    Output::Json => {
                        let v = serde_json::json!({ "messages": reg.message_names(), "enums": reg.enum_names() });
                        println!("{}", serde_json::to_string_pretty(&v)?);
                    }
                },
                Some(name) => {
                    let md = reg.message(&name).with_context(|| format!("message type {:?} not found in {}", name, schema.display()))?;
                    match cli.output {
                        Output::Human => {
                            println!("{:<24} {:<10} {:<14} {:<24} {:<12} TYPE", "FIELD", "KIND", "CARDINALITY", "JSON", "ONEOF");
                            for f in md.fields() {
                                println!(
                                    "{:<24} {:<10} {:<14} {:<24} {:<12} {}",
                                    f.name(),
                                    f.kind().as_str(),
                                    cardinality(f),
                                    f.json_name(),
                                    f.oneof().unwrap_or("-"),
                                    f.field_type().type_name().unwrap_or("-"),
                                );
                            }
                            for (group, members) in oneof_groups(md) {
                                println!("oneof {}: {}", group, members.join(", "));
                            }
                        }
                        Output::Json => {
                            #[derive(serde::Serialize)]
                            struct Row<'a> {
                                name: &'a str,
                                kind: &'a str,
                                cardinality: String,
                                json_name: &'a str,
                                #[serde(skip_serializing_if = "Option::is_none")]
                                oneof: Option<&'a str>,
                                #[serde(skip_serializing_if = "Option::is_none")]
                                type_name: Option<&'a str>,
                            }
                            let rows: Vec<_> = md
                                .fields()
                                .iter()
                                .map(|f| Row {
                                    name: f.name(),
                                    kind: f.kind().as_str(),
                                    cardinality: cardinality(f),
                                    json_name: f.json_name(),
                                    oneof: f.oneof(),
                                    type_name: f.field_type().type_name(),
                                })
                                .collect();
                            let oneofs: serde_json::Map<String, serde_json::Value> =
                                oneof_groups(md).into_iter().map(|(g, members)| (g.to_string(), serde_json::json!(members))).collect();
                            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "fields": rows, "oneofs": oneofs }))?);
                        }
                    }
                }
            }
        }
        Commands::Check { schema } => {
            let reg = load(&schema)?;
            let dangling = reg.dangling_references();
            match cli.output {
                Output::Human => {
                    if dangling.is_empty() {
                        println!("ok: {} messages, {} enums", reg.message_names().len(), reg.enum_names().len());
                    }
                    for d in &dangling {
                        println!("{}.{}: unresolved type {}", d.message, d.field, d.type_name);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "dangling": dangling }))?),
            }
            if !dangling.is_empty() {
                warn!(count = dangling.len(), "schema has unresolved type references");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_message(msg: &Message, reg: &Registry, output: Output) -> Result<()> {
    let v = render_json(msg, reg);
    match output {
        Output::Human => {
            let mut lines = Vec::new();
            flatten("", &v, &mut lines);
            for (path, value) in lines { println!("{} = {}", path, value); }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(&v)?),
    }
    Ok(())
}

fn cardinality(f: &FieldDescriptor) -> String {
    match f.cardinality() {
        Cardinality::Singular => "singular".to_string(),
        Cardinality::Repeated => "repeated".to_string(),
        Cardinality::Map(key) => format!("map<{}>", key.as_str()),
    }
}

/// oneof groups in declaration order, each with its member field names.
fn oneof_groups(md: &MessageDescriptor) -> Vec<(&str, Vec<&str>)> {
    let mut groups: Vec<&str> = Vec::new();
    for g in md.fields().iter().filter_map(|f| f.oneof()) {
        if !groups.contains(&g) { groups.push(g); }
    }
    groups.into_iter().map(|g| (g, md.oneof_members(g).map(|f| f.name()).collect())).collect()
}

/// `a.b = 1`, `tags[0] = "x"`, `labels[env] = "prod"`. Struct and Value payloads are
/// flattened like any other object.
fn flatten(prefix: &str, v: &serde_json::Value, out: &mut Vec<(String, String)>) {
    match v {
        serde_json::Value::Object(map) if !map.is_empty() => {
            for (k, child) in map {
                let path = if prefix.is_empty() { k.clone() } else if is_map_key(k) { format!("{}[{}]", prefix, k) } else { format!("{}.{}", prefix, k) };
                flatten(&path, child, out);
            }
        }
        serde_json::Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", prefix, i), child, out);
            }
        }
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

/// Object keys that cannot be field names are shown in bracket form.
fn is_map_key(k: &str) -> bool {
    k.is_empty() || !k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') || k.starts_with(|c: char| c.is_ascii_digit())
}
