use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use fixture_connect::demo::run_demo;
use fixture_connect::{ConnectConfig, TransportKind};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ConnectConfig> {
    match path {
        Some(path) => ConnectConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ConnectConfig::default()),
    }
}

fn cli() -> Command {
    let config_file = |id: &'static str| {
        Arg::new(id)
            .long(id)
            .value_parser(value_parser!(PathBuf))
            .help("TOML configuration file")
    };

    Command::new("fixture-connect")
        .version(fixture_connect::VERSION)
        .about("Fixture state synchronization between a sandbox and its control surface")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("demo")
                .about("Run a scripted session against the simulated counter fixture")
                .arg(
                    Arg::new("transport")
                        .long("transport")
                        .default_value("channel")
                        .value_parser(["channel", "stream"])
                        .help("Transport carrying the protocol"),
                )
                .arg(
                    Arg::new("poll-ms")
                        .long("poll-ms")
                        .value_parser(value_parser!(u64).range(1..))
                        .help("Change detector poll interval in milliseconds"),
                )
                .arg(
                    Arg::new("json-logs")
                        .long("json-logs")
                        .action(ArgAction::SetTrue)
                        .help("Emit logs as JSON"),
                )
                .arg(config_file("config")),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration as TOML")
                .arg(config_file("file")),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(&cli().get_matches()).await
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("demo", args)) => {
            init_tracing(args.get_flag("json-logs"));

            let kind: TransportKind = args
                .get_one::<String>("transport")
                .map_or(Ok(TransportKind::default()), |s| s.parse())?;
            let mut config = load_config(args.get_one::<PathBuf>("config"))?;
            if let Some(poll_ms) = args.get_one::<u64>("poll-ms") {
                config = config.with_poll_interval(Duration::from_millis(*poll_ms));
            }

            tracing::info!(transport = %kind, poll_ms = config.poll_interval_ms, "starting demo");
            let report = run_demo(kind, &config).await?;

            for event in &report.events {
                println!("{}", serde_json::to_string(event)?);
            }
            for (step, output) in &report.outputs {
                tracing::info!(step = %step, output = %output, "sandbox output");
            }
        }
        Some(("config", args)) => {
            let config = load_config(args.get_one::<PathBuf>("file"))?;
            print!("{}", config.to_toml()?);
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand '{other}'"),
        None => anyhow::bail!("no subcommand given"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[tokio::test]
    async fn missing_subcommand_is_an_error() {
        let matches = cli()
            .subcommand_required(false)
            .arg_required_else_help(false)
            .try_get_matches_from(["fixture-connect"])
            .unwrap();

        let err = run(&matches).await.unwrap_err();
        assert_eq!(err.to_string(), "no subcommand given");
    }

    #[tokio::test]
    async fn unknown_subcommand_is_an_error() {
        let matches = cli()
            .subcommand(Command::new("launch"))
            .try_get_matches_from(["fixture-connect", "launch"])
            .unwrap();

        let err = run(&matches).await.unwrap_err();
        assert_eq!(err.to_string(), "unknown subcommand 'launch'");
    }

    #[tokio::test]
    async fn config_subcommand_prints_defaults() {
        let matches = cli().try_get_matches_from(["fixture-connect", "config"]).unwrap();
        run(&matches).await.unwrap();
    }
}
