use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use fruit_price_predictor::{
    domain::{Field, FormModel, RequestState, SubmitOutcome},
    infra::{
        ClientBuildError, ClientConfig, ConfigError, PredictionClient, API_URL_ENV, TIMEOUT_ENV,
    },
    ui::console::{render_fruits, render_service_info, render_state, render_validation},
    util::version::{version_label, APP_NAME},
    PredictionFailure, PredictionSession,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exit {
    Success,
    /// The request was sent and ended in `Failed`.
    Failed,
    /// The form never left the client because it failed validation.
    InvalidInput,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Failed => ExitCode::FAILURE,
            Exit::InvalidInput => ExitCode::from(2),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fruit-price", version, about = "Predict retail fruit prices from product attributes")]
struct Cli {
    /// Base URL of the prediction service.
    #[arg(long, env = API_URL_ENV, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = TIMEOUT_ENV, global = true)]
    timeout_secs: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the inputs and request a price prediction from every model.
    Predict(PredictArgs),
    /// List the fruits the service can encode.
    Fruits,
    /// Show the service banner and its models.
    Info,
}

/// Numeric inputs are taken as raw text and validated by the form, so the
/// messages match what the form reports for any other front end.
#[derive(Debug, Args)]
struct PredictArgs {
    /// Fruit name, checked against the service's `/fruits` catalog. The
    /// built-in list is used when the catalog cannot be loaded.
    #[arg(long)]
    fruit: Option<String>,
    /// Fresh, Frozen, Dried or Juice.
    #[arg(long)]
    form: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    yield_factor: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    cup_eq_size: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    cup_eq_price: Option<String>,
    /// Print the raw predictions as JSON.
    #[arg(long)]
    json: bool,
}

impl PredictArgs {
    fn provided_fields(&self) -> Vec<(Field, &str)> {
        [
            (Field::Fruit, &self.fruit),
            (Field::Form, &self.form),
            (Field::YieldFactor, &self.yield_factor),
            (Field::CupEqSize, &self.cup_eq_size),
            (Field::CupEqPrice, &self.cup_eq_price),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientBuildError),
    #[error("{}", .0.user_message())]
    Request(#[from] PredictionFailure),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(app = APP_NAME, version = %version_label(), "starting");

    match run(cli).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Exit, CliError> {
    let client = PredictionClient::new(&client_config(&cli)?)?;

    match cli.command {
        Command::Predict(args) => predict(client, &args).await,
        Command::Fruits => {
            let fruits = client.list_fruits().await?;
            println!("{}", render_fruits(&fruits));
            Ok(Exit::Success)
        }
        Command::Info => {
            let info = client.service_info().await?;
            println!("{}", render_service_info(&info));
            Ok(Exit::Success)
        }
    }
}

/// Clap has already applied the environment fallback, so the parsed values
/// stand in for the environment here.
fn client_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    ClientConfig::from_lookup(|key| match key {
        API_URL_ENV => cli.api_url.clone(),
        TIMEOUT_ENV => cli.timeout_secs.clone(),
        _ => None,
    })
}

async fn predict(client: PredictionClient, args: &PredictArgs) -> Result<Exit, CliError> {
    let mut form = FormModel::new();
    if args.fruit.is_some() {
        match client.list_fruits().await {
            Ok(fruits) if !fruits.is_empty() => form = form.with_catalog(fruits),
            Ok(_) => debug!("service reported an empty fruit catalog"),
            Err(err) => {
                warn!(error = %err, "could not load the fruit catalog, using the built-in list");
            }
        }
    }

    let mut session = PredictionSession::with_form(client, form);
    for (field, value) in args.provided_fields() {
        session.set_field(field, value);
    }

    if let SubmitOutcome::Rejected(report) = session.submit() {
        eprintln!("{}", render_validation(&report));
        return Ok(Exit::InvalidInput);
    }

    let state = session.settle().await;
    match state {
        RequestState::Succeeded(result) if args.json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        RequestState::Failed(_) => {
            eprintln!("{}", render_state(state));
            return Ok(Exit::Failed);
        }
        _ => println!("{}", render_state(state)),
    }
    Ok(Exit::Success)
}
