// The catalog CLI.
// Loads a database and reports the closure rules and equivalence relations mined from it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use proof_transforms::closure_rules::ClosureRule;
use proof_transforms::config::TransformConfig;
use proof_transforms::database::Database;
use proof_transforms::transforms::TransformInfo;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(
    name = "catalog",
    about = "Report the closure and equivalence rules mined from a database",
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    /// The database, as JSON
    #[clap(value_name = "FILE")]
    database: PathBuf,

    /// A JSON file selecting which catalogs to build
    #[clap(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Only report closure rules
    Closure,

    /// Only report equivalence relations
    Equivalence,
}

#[derive(Serialize)]
struct ClosureEntry {
    kind: String,
    assertion: String,
    symbol: String,
    arguments: Vec<Option<String>>,
    template: String,
}

#[derive(Serialize)]
struct RelationEntry {
    relation: String,
    type_name: Option<String>,
    commutative: Option<String>,
    transitive: Option<String>,
}

#[derive(Serialize, Default)]
struct Report {
    closure: Vec<ClosureEntry>,
    equivalence: Vec<RelationEntry>,
}

fn closure_entry(db: &Database, rule: &ClosureRule) -> ClosureEntry {
    let arity = rule.key.const_subst.len();
    ClosureEntry {
        kind: rule.kind.to_string(),
        assertion: rule.assertion.label.clone(),
        symbol: db.name(rule.key.symbol).to_string(),
        arguments: (0..arity)
            .map(|i| rule.key.const_subst.get(i).map(|c| db.display(c)))
            .collect(),
        template: db.display(rule.key.template.node()),
    }
}

fn build_report(db: &Database, info: &TransformInfo, command: &Option<Command>) -> Report {
    let mut report = Report::default();
    if !matches!(command, Some(Command::Equivalence)) {
        report.closure = info
            .closure
            .rules()
            .iter()
            .map(|rule| closure_entry(db, rule))
            .collect();
    }
    if !matches!(command, Some(Command::Closure)) {
        let eq = &info.equivalence;
        report.equivalence = eq
            .relations()
            .iter()
            .map(|&op| RelationEntry {
                relation: db.name(op).to_string(),
                type_name: eq
                    .commutative(op)
                    .and_then(|a| db.symbols.node_type(a.conclusion.child(0)))
                    .map(|t| db.symbols.type_name(t).to_string()),
                commutative: eq.commutative(op).map(|a| a.label.clone()),
                transitive: eq.transitive(op).map(|a| a.label.clone()),
            })
            .collect();
    }
    report
}

fn print_report(report: &Report) {
    for entry in &report.closure {
        let arguments: Vec<&str> = entry
            .arguments
            .iter()
            .map(|a| a.as_deref().unwrap_or("*"))
            .collect();
        println!(
            "{} {}: {}({}) {}",
            entry.kind,
            entry.assertion,
            entry.symbol,
            arguments.join(", "),
            entry.template
        );
    }
    for entry in &report.equivalence {
        println!(
            "equivalence {} on {}: {}, {}",
            entry.relation,
            entry.type_name.as_deref().unwrap_or("?"),
            entry.commutative.as_deref().unwrap_or("?"),
            entry.transitive.as_deref().unwrap_or("?")
        );
    }
}

fn main() {
    // Use RUST_LOG env var to control log levels, e.g.:
    //   RUST_LOG=proof_transforms::closure_rules=trace catalog set.json
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match TransformConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                println!("Error loading config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => TransformConfig::default(),
    };

    let db = match Database::load(&args.database) {
        Ok(db) => db,
        Err(e) => {
            println!("Error loading {}: {}", args.database.display(), e);
            std::process::exit(1);
        }
    };

    let info = TransformInfo::new(&db, &config);
    let report = build_report(&db, &info, &args.command);
    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                println!("Error serializing report: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_report(&report);
    }
}
