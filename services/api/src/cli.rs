use crate::demo::{run_demo, run_quizzes, run_score, DemoArgs, QuizzesArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use cyberassess::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Cybersecurity Maturity Assessment",
    about = "Score cybersecurity maturity questionnaires and serve the evaluation API",
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
    /// Score a stored answers document against a quiz
    Score(ScoreArgs),
    /// List the quizzes available for scoring
    Quizzes(QuizzesArgs),
    /// Walk through submission, recomputation and legacy score correction
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
        Command::Quizzes(args) => run_quizzes(args),
        Command::Demo(args) => run_demo(args),
    }
}
