//! planweave CLI binary: break a query into subtasks, solve and refine them
//! with a language model, print the answer.
//!
//! Subcommands: none (run a query, the default) and `graph` (print the loop
//! topology).

mod log_format;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cli::{
    render_outcome, render_topology, run_query, write_output, OfflineLlm, OutputFormat, RunError,
    RunOptions, DEFAULT_QUERY,
};
use planweave::{build_plan_runner, CancellationToken, PlanBuildConfig};

#[derive(Parser, Debug)]
#[command(name = "planweave")]
#[command(about = "Plan, solve and refine a query with a language model")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// Query to plan for (default: "How to plan a trip to Japan?")
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Include the per-iteration lifecycle history in the output
    #[arg(long)]
    history: bool,

    /// Output format; `dot` prints the subtask lifecycle graph
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Refine cycles before finalizing (overrides PLAN_MAX_ITERATIONS)
    #[arg(long, value_name = "N")]
    max_iterations: Option<u32>,

    /// Model name (overrides PLAN_MODEL / OPENAI_MODEL)
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Verbose: config summary, node enter/exit and plan progress on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Answer with a built-in offline model (no API key needed)
    #[arg(long)]
    offline: bool,

    /// Write output to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// With --format json, pretty-print (multi-line)
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the plan/solve/refine/finalize graph
    Graph {
        /// `text` for an edge list, `dot` (default) for Graphviz
        #[arg(long, value_enum, default_value_t = OutputFormat::Dot)]
        format: OutputFormat,
    },
}

fn query_from(args: &Args) -> String {
    if args.query.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        args.query.join(" ")
    }
}

/// Cancels `token` on the first Ctrl-C; the run stops before its next step.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling after the current step...");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply("planweave", None).ok();
    let log_guard = logging::init()?;

    let args = Args::parse();
    let build_config = PlanBuildConfig::from_env();

    if let Some(Command::Graph { format }) = &args.cmd {
        // topology does not depend on the client
        let runner = build_plan_runner(&build_config, Some(Arc::new(OfflineLlm)), false)?;
        write_output(&render_topology(&runner, *format), args.file.as_deref())?;
        return Ok(());
    }

    let opts = RunOptions {
        query: query_from(&args),
        max_iterations: args.max_iterations,
        model: args.model.clone(),
        verbose: args.verbose,
        offline: args.offline,
        history: args.history || args.format.needs_history(),
    };

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let code = match run_query(&opts, build_config, None, cancel).await {
        Ok(outcome) => {
            let rendered = render_outcome(&outcome, args.format, args.pretty)?;
            write_output(&rendered, args.file.as_deref())?;
            0
        }
        Err(e @ RunError::EmptyQuery) => {
            eprintln!("{}", e);
            2
        }
        Err(e) if e.is_cancelled() => {
            eprintln!("Cancelled.");
            130
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("Error: {}", e);
            1
        }
    };
    // flush the log file before exiting
    drop(log_guard);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
