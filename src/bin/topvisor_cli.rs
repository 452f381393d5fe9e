//! topvisor-cli: run Topvisor API operations from the shell
//!
//! Usage:
//!   topvisor-cli run <operation> [--args <json>] [--dry-run]   Execute an operation
//!   topvisor-cli list                                          List operations
//!   topvisor-cli describe <operation>                          Show parameters of an operation

use anyhow::{anyhow, bail, Context};
use topvisor_client::operation::{DateRule, OperationDescriptor, ParamSpec};
use topvisor_client::{Arguments, DecodedResponse, Operation, TopvisorClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]).await,
        "list" => {
            cmd_list();
            Ok(())
        }
        "describe" => cmd_describe(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("topvisor-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"topvisor-cli: Topvisor API command line

USAGE:
    topvisor-cli <COMMAND> [OPTIONS]

COMMANDS:
    run <operation> [--args <json>] [--dry-run]
                                Execute an operation; --dry-run prints the request instead
    list                        List available operations
    describe <operation>        Show parameters of an operation
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    TOPVISOR_USER_ID            Account identifier
    TOPVISOR_API_KEY            Secret key (the OS keyring is consulted first)
    TOPVISOR_BASE_URL           API base URL
    TOPVISOR_HTTP_TIMEOUT_SECS  Request timeout
    RUST_LOG                    Log filter (default: warn)"#
    );
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_arguments(raw: Option<&str>) -> anyhow::Result<Arguments> {
    let Some(raw) = raw else {
        return Ok(Arguments::new());
    };
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--args must be a JSON object")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => bail!("--args must be a JSON object, got {other}"),
    }
}

async fn cmd_run(args: &[String]) -> anyhow::Result<()> {
    let name = args
        .first()
        .ok_or_else(|| anyhow!("run requires an operation name"))?;
    let operation: Operation = name.parse()?;
    let arguments = parse_arguments(flag_value(args, "--args"))?;

    if args.iter().any(|a| a == "--dry-run") {
        let client = TopvisorClient::with_transport(std::sync::Arc::new(NoTransport));
        let prepared = client.prepare(operation, &arguments)?;
        println!("POST {}", prepared.endpoint);
        println!("{}", serde_json::to_string_pretty(&prepared.payload)?);
        return Ok(());
    }

    let client = TopvisorClient::builder().build()?;
    match client.execute_operation(operation, &arguments).await? {
        DecodedResponse::Structured(structured) => {
            println!("{}", serde_json::to_string_pretty(&structured.result)?);
        }
        DecodedResponse::Rows(rows) => {
            for row in rows {
                println!("{}", row.join("\t"));
            }
        }
    }
    Ok(())
}

/// Transport for `--dry-run`; never reached because nothing is dispatched.
struct NoTransport;

#[async_trait::async_trait]
impl topvisor_client::transport::Transport for NoTransport {
    async fn send(
        &self,
        _endpoint: &str,
        _payload: &topvisor_client::client::Payload,
        _request_id: &str,
    ) -> Result<topvisor_client::transport::TransportResponse, topvisor_client::transport::TransportError>
    {
        Err(topvisor_client::transport::TransportError::Other(
            "dry run does not send requests".into(),
        ))
    }
}

fn cmd_list() {
    for op in Operation::ALL {
        let d = op.descriptor();
        println!("{:<24} {:<10} {}", op.name(), d.service.name(), d.endpoint_path());
    }
}

fn describe_param(spec: &ParamSpec, required: bool) {
    let mut line = format!(
        "  {:<26} {:<22} {}",
        spec.name,
        spec.kind.type_name(),
        if required { "required" } else { "optional" }
    );
    if spec.wire != spec.name {
        line.push_str(&format!(", sent as '{}'", spec.wire));
    }
    if let Some(default) = spec.default {
        line.push_str(&format!(", default {}", default));
    }
    println!("{line}");
}

fn cmd_describe(args: &[String]) -> anyhow::Result<()> {
    let name = args
        .first()
        .ok_or_else(|| anyhow!("describe requires an operation name"))?;
    let operation: Operation = name.parse()?;
    let d: &OperationDescriptor = operation.descriptor();

    println!("{} → POST {} ({:?})", operation, d.endpoint_path(), d.encoding);
    for spec in d.required {
        describe_param(spec, true);
    }
    match d.dates {
        DateRule::None => {}
        DateRule::ListOrRange => println!("  dates | date1 + date2      YYYY-MM-DD          one form required"),
        DateRule::ExactPair => println!("  dates                      two YYYY-MM-DD dates required"),
    }
    for spec in d.optional {
        describe_param(spec, false);
    }
    println!("  universal: limit, offset, fields, filters, id, orders");
    Ok(())
}
