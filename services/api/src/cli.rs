use crate::demo::{run_demo, run_evaluate, run_regions, DemoArgs, EvaluateArgs, RegionsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mortgage_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Mortgage Risk Engine",
    about = "Evaluate mortgage applications against LTV and regional overheat policy",
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
    /// Evaluate a single loan application and print the assessment
    Evaluate(EvaluateArgs),
    /// List the regional overheat watchlist, hottest first
    Regions(RegionsArgs),
    /// Walk through the reference scenarios for stakeholder demos
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
        Command::Evaluate(args) => run_evaluate(args),
        Command::Regions(args) => run_regions(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["mortgage-risk-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_evaluate_arguments() {
        let cli = Cli::try_parse_from([
            "mortgage-risk-api",
            "evaluate",
            "--existing-properties",
            "2",
            "--region",
            "新竹市",
            "--price",
            "30000000",
            "--presale",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.existing_properties, 2);
                assert_eq!(args.region, "新竹市");
                assert_eq!(args.price, 30_000_000);
                assert!(args.presale);
                assert!(!args.json);
            }
            other => panic!("expected evaluate command, got {other:?}"),
        }
    }

    #[test]
    fn negative_counts_reach_validation() {
        let cli = Cli::try_parse_from([
            "mortgage-risk-api",
            "evaluate",
            "--existing-properties",
            "-1",
            "--region",
            "台北市",
            "--price",
            "1000",
        ])
        .expect("negative numbers parse");

        match cli.command {
            Some(Command::Evaluate(args)) => assert_eq!(args.existing_properties, -1),
            other => panic!("expected evaluate command, got {other:?}"),
        }
    }
}
