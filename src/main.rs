//! Binary entry point for the `modctl` CLI.

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use modctl::{CallContext, EnvSource, ModuleControl, Modules, ModulesError};

mod cli;

use cli::{Cli, Command};

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "MODCTL_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid deadline: {0}")]
    Deadline(String),
    #[error(transparent)]
    Call(#[from] ModulesError),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(lines) => {
            write_lines(io::stdout(), &lines);
            0
        }
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

async fn run(cli: Cli) -> Result<Vec<String>, CliError> {
    let ctx = call_context(&cli)?;
    let modules = Modules::from_process_env();
    dispatch(&modules, &ctx, cli.command).await
}

fn call_context(cli: &Cli) -> Result<CallContext, CliError> {
    let mut ctx = CallContext::new();
    if let Some(seconds) = cli.deadline {
        let limit = Duration::try_from_secs_f64(seconds)
            .map_err(|err| CliError::Deadline(format!("{seconds}: {err}")))?;
        ctx = ctx.with_deadline(limit);
    }
    if let Some(ticket) = cli.api_ticket.as_deref() {
        ctx = ctx.with_api_ticket(ticket);
    }
    Ok(ctx)
}

async fn dispatch<E, L, A>(
    modules: &Modules<E, L, A>,
    ctx: &CallContext,
    command: Command,
) -> Result<Vec<String>, CliError>
where
    E: EnvSource,
    L: ModuleControl,
    A: ModuleControl,
{
    let lines = match command {
        Command::List => modules.list(ctx).await?,
        Command::Versions(args) => modules.versions(ctx, &args.module).await?,
        Command::DefaultVersion(args) => vec![modules.default_version(ctx, &args.module).await?],
        Command::Instances(args) => {
            let count = modules
                .num_instances(ctx, &args.module, &args.version)
                .await?;
            vec![count.to_string()]
        }
        Command::SetInstances(args) => {
            modules
                .set_num_instances(
                    ctx,
                    &args.target.module,
                    &args.target.version,
                    args.instances,
                )
                .await?;
            Vec::new()
        }
        Command::Start(args) => {
            modules.start(ctx, &args.module, &args.version).await?;
            Vec::new()
        }
        Command::Stop(args) => {
            modules.stop(ctx, &args.module, &args.version).await?;
            Vec::new()
        }
    };
    Ok(lines)
}

fn write_lines(mut target: impl Write, lines: &[String]) {
    for line in lines {
        if writeln!(target, "{line}").is_err() {
            break;
        }
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
