//! Command-line interface for confee
//! Diagnostic front end over the library crates: fetch a project schema,
//! inspect what extraction finds in a template file, or render one file
//! against a context.
//!
//! Usage:
//!   confee fetch --url <url> --project <id> [--cache]
//!   confee extract <path>
//!   confee render <path> [--context <ctx.json>]

use clap::{Arg, ArgAction, Command};
use confee_schema::{fetch_schema, FetchOptions};
use confee_tpl::{extract, render};
use serde_json::{json, Value};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = Command::new("confee")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Schema-driven code generation toolchain")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("fetch")
                .about("Fetch the project schema and optionally cache it")
                .arg(
                    Arg::new("url")
                        .long("url")
                        .help("Schema service endpoint")
                        .required(true),
                )
                .arg(
                    Arg::new("project")
                        .long("project")
                        .help("Project id to fetch")
                        .required(true),
                )
                .arg(
                    Arg::new("cache")
                        .long("cache")
                        .help("Persist the bundle under .confee/config.json")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("extract")
                .about("Show the skeleton and lookup tables extraction produces for a file")
                .arg(Arg::new("path").help("File to extract").required(true).index(1)),
        )
        .subcommand(
            Command::new("render")
                .about("Extract and render one file against a context object")
                .arg(Arg::new("path").help("File to render").required(true).index(1))
                .arg(
                    Arg::new("context")
                        .long("context")
                        .short('c')
                        .help("JSON file holding the render context (default: empty object)"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("fetch", sub)) => {
            let url = sub.get_one::<String>("url").expect("url is required");
            let project = sub.get_one::<String>("project").expect("project is required");
            handle_fetch_command(url, project, sub.get_flag("cache"));
        }
        Some(("extract", sub)) => {
            let path = sub.get_one::<String>("path").expect("path is required");
            handle_extract_command(path);
        }
        Some(("render", sub)) => {
            let path = sub.get_one::<String>("path").expect("path is required");
            handle_render_command(path, sub.get_one::<String>("context"));
        }
        _ => unreachable!("subcommand is required"),
    }
}

/// Handle the fetch command
fn handle_fetch_command(url: &str, project: &str, cache: bool) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        });

    let mut options = FetchOptions::new(url, project);
    options.cache = cache;

    let bundle = runtime.block_on(fetch_schema(&options)).unwrap_or_else(|e| {
        eprintln!("Fetch error: {}", e);
        std::process::exit(1);
    });

    println!(
        "Fetched schema for project {}: {} main pages, {} paginations, {} options",
        project,
        bundle.main_pages.len(),
        bundle.paginations.len(),
        bundle.pagination_options.len()
    );
    if cache {
        println!("Cached at {}", options.cache_pathname().display());
    }
}

/// Handle the extract command
fn handle_extract_command(path: &str) {
    let source = read_file(path);
    let extraction = extract(&source, path).unwrap_or_else(|e| {
        eprintln!("Extraction error: {}", e);
        std::process::exit(1);
    });

    let report = json!({
        "skeleton": extraction.skeleton,
        "prescripts": extraction.prescripts,
        "templates": extraction.templates,
    });
    let formatted = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        eprintln!("Error formatting extraction: {}", e);
        std::process::exit(1);
    });
    println!("{}", formatted);
}

/// Handle the render command
fn handle_render_command(path: &str, context: Option<&String>) {
    let source = read_file(path);
    let context: Value = match context {
        Some(pathname) => {
            let text = read_file(pathname);
            serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Context file is not valid JSON: {}", e);
                std::process::exit(1);
            })
        }
        None => json!({}),
    };

    let extraction = extract(&source, path).unwrap_or_else(|e| {
        eprintln!("Extraction error: {}", e);
        std::process::exit(1);
    });
    let output = render(&extraction, &context).unwrap_or_else(|e| {
        eprintln!("Render error: {}", e);
        std::process::exit(1);
    });
    print!("{}", output);
}

fn read_file(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Cannot read {}: {}", path, e);
        std::process::exit(1);
    })
}
