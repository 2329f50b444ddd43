use clap::Parser;

use retirement_planner::cli::{Cli, Command, run_project};
use retirement_planner::{api, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init();

    let result = match Cli::parse().command {
        Command::Serve(args) => api::run_http_server(args.addr()).await,
        Command::Project(args) => run_project(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
