use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Context, OptionExt};
use livestream_provider::config::ProviderConfig;
use livestream_provider::livestream_api::{AccountClient, Credentials, LivestreamClient};
use serde::Deserialize;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Issue raw Livestream API requests with the provider's client.
///
/// Credentials come from `LIVESTREAM_API_KEY`, `LIVESTREAM_ACCOUNT_ID` and (optionally)
/// `LIVESTREAM_CLIENT_ID`.
#[derive(Parser, Debug)]
#[command(name = "livestream-cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available request methods
    List,
    /// Run one request method and print its response as JSON
    Req {
        method: Method,

        /// JSON object with the method's arguments, e.g. '{"eventId": "7"}'
        args: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum Method {
    /// {"eventId": "..."}
    GetEvent,
    /// {"eventId": "...", "cursor": "..."?}
    GetEventVideos,
    /// {"eventId": "...", "videoId": "..."}
    GetVideo,
    /// {}
    ListAccounts,
    /// {"eventId": "..."}
    GetAllEventVods,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    event_id: Option<String>,
    video_id: Option<String>,
    cursor: Option<String>,
}

impl Args {
    fn event_id(&self) -> eyre::Result<&str> {
        self.event_id.as_deref().ok_or_eyre("missing \"eventId\" argument")
    }

    fn video_id(&self) -> eyre::Result<&str> {
        self.video_id.as_deref().ok_or_eyre("missing \"videoId\" argument")
    }
}

fn env(key: &str) -> eyre::Result<String> {
    std::env::var(key).with_context(|| format!("read {key} from the environment"))
}

fn print_json(value: &impl serde::Serialize) -> eyre::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize response")?;
    println!("{json}");
    Ok(())
}

fn list_methods() {
    for method in Method::value_variants() {
        if let Some(value) = method.to_possible_value() {
            let args = value.get_help().map(|h| h.to_string()).unwrap_or_default();
            println!("{:<20} {args}", value.get_name());
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let (method, raw_args) = match Cli::parse().command {
        Command::List => {
            list_methods();
            return Ok(());
        }
        Command::Req { method, args } => (method, args),
    };

    let args: Args = match raw_args.as_deref() {
        Some(raw) => serde_json::from_str(raw).context("parse json-args")?,
        None => Args::default(),
    };

    let config = ProviderConfig::from_env().context("load configuration")?;
    let client = LivestreamClient::new(&config)?;
    let api_key = env("LIVESTREAM_API_KEY")?;

    let account = || -> eyre::Result<AccountClient> {
        let credentials = Credentials::new(
            api_key.clone(),
            env("LIVESTREAM_ACCOUNT_ID")?,
            std::env::var("LIVESTREAM_CLIENT_ID").ok(),
        );
        client.account(credentials).context("create account client")
    };
    tracing::debug!(?method, ?args, "running request");

    match method {
        Method::ListAccounts => print_json(
            &client
                .list_accounts(&api_key)
                .await
                .context("list accounts")?,
        ),
        Method::GetEvent => print_json(
            &account()?
                .get_event(args.event_id()?)
                .await
                .context("fetch event")?,
        ),
        Method::GetEventVideos => print_json(
            &account()?
                .get_event_videos(args.event_id()?, args.cursor.as_deref())
                .await
                .context("fetch event videos")?,
        ),
        Method::GetVideo => print_json(
            &account()?
                .get_video(args.event_id()?, args.video_id()?)
                .await
                .context("fetch video")?,
        ),
        Method::GetAllEventVods => print_json(
            &account()?
                .get_all_event_vods(args.event_id()?)
                .await
                .context("walk event videos")?,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_req() {
        let cli = Cli::try_parse_from([
            "livestream-cli",
            "req",
            "get_event_videos",
            r#"{"eventId": "7"}"#,
        ])
        .unwrap();
        match cli.command {
            Command::Req { method, args } => {
                assert_eq!(method, Method::GetEventVideos);
                assert_eq!(args.as_deref(), Some(r#"{"eventId": "7"}"#));
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["livestream-cli", "req", "get_clip"]).is_err());
    }
}
