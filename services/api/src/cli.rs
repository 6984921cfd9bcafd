use crate::demo::{run_classify, run_demo, run_slots, ClassifyArgs, DemoArgs, SlotsArgs};
use crate::server;
use admissions_leads::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Admissions Lead Qualification",
    about = "Classify, route and book admissions leads from the command line",
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
    /// Offline tools for lead exports and counsellor calendars
    Leads {
        #[command(subcommand)]
        command: LeadsCommand,
    },
    /// Walk the reference lead scenarios through the service with in-memory sinks
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LeadsCommand {
    /// Re-score an exported lead CSV against the current decision table
    Classify(ClassifyArgs),
    /// List bookable slots for a counsellor on a date
    Slots(SlotsArgs),
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
        Command::Leads {
            command: LeadsCommand::Classify(args),
        } => run_classify(args),
        Command::Leads {
            command: LeadsCommand::Slots(args),
        } => run_slots(args),
        Command::Demo(args) => run_demo(args),
    }
}
