use crate::commands::{
    run_assess, run_normalize, run_resolve_state, AssessArgs, NormalizeArgs, ResolveStateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_decisioning::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "credit-decisioning",
    about = "Normalize credit bureau reports and assess short-tenure loan eligibility",
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
    /// Normalize a raw bureau response and print the canonical report
    Normalize(NormalizeArgs),
    /// Evaluate an assessment request, optionally against a bureau response
    Assess(AssessArgs),
    /// Resolve a two-letter state code from free text or a postal code
    ResolveState(ResolveStateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Eligibility policy overriding the standard product
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Normalize(args) => run_normalize(args),
        Command::Assess(args) => run_assess(args),
        Command::ResolveState(args) => run_resolve_state(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["credit-decisioning"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn assess_accepts_payload_and_policy() {
        let cli = Cli::try_parse_from([
            "credit-decisioning",
            "assess",
            "request.json",
            "--payload",
            "bureau.json",
            "--policy",
            "policy.json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Assess(args)) => {
                assert_eq!(args.request, PathBuf::from("request.json"));
                assert_eq!(args.payload, Some(PathBuf::from("bureau.json")));
                assert_eq!(args.policy, Some(PathBuf::from("policy.json")));
                assert!(!args.json);
            }
            other => panic!("expected assess command, got {other:?}"),
        }
    }

    #[test]
    fn resolve_state_takes_named_flags() {
        let cli = Cli::try_parse_from([
            "credit-decisioning",
            "resolve-state",
            "--postal-code",
            "560038",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::ResolveState(args)) => {
                assert!(args.state.is_none());
                assert_eq!(args.postal_code.as_deref(), Some("560038"));
            }
            other => panic!("expected resolve-state command, got {other:?}"),
        }
    }
}
