use crate::demo::{run_demo, run_schedule, run_score, DemoArgs, ScheduleArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lending_crm::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lending CRM",
    about = "Run the lending CRM decision engine as a service or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an underwriting snapshot and print the breakdown
    Score(ScoreArgs),
    /// Print a fixed-rate amortization schedule
    Schedule(ScheduleArgs),
    /// Walk a sample deal through scoring, stage changes and scheduling
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Schedule(args) => run_schedule(args),
        Command::Demo(args) => run_demo(args),
    }
}
