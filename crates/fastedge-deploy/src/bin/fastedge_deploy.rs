//! fastedge-deploy: Deploy WASM applications and secrets to FastEdge.
//!
//! Every flag can also be given as a GitHub Actions input variable
//! (`INPUT_<NAME>`), so the binary runs unchanged as an action step.
//!
//! # Usage
//!
//! ```bash
//! # Create or update an application
//! fastedge-deploy app --api-key $KEY --api-url https://api.example.com \
//!     --wasm-file dist/app.wasm --app-name my-app
//!
//! # Create or update a secret
//! fastedge-deploy secret --api-key $KEY --api-url https://api.example.com \
//!     --secret-name db-password --secret "$DB_PASSWORD"
//! ```

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use fastedge_deploy::{run_app, run_secret, AppInputs, SecretInputs, WorkflowReporter};
use std::process;

/// Deploy WASM applications and secrets to FastEdge.
#[derive(Parser, Debug)]
#[command(name = "fastedge-deploy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update an application from a WASM binary
    App(AppArgs),
    /// Create or update a secret
    Secret(SecretArgs),
}

#[derive(Args, Debug)]
struct AppArgs {
    /// API key used for authentication
    #[arg(long, env = "INPUT_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Base URL of the API
    #[arg(long, env = "INPUT_API_URL", default_value = "")]
    api_url: String,

    /// Path to the WASM binary
    #[arg(long, env = "INPUT_WASM_FILE", default_value = "")]
    wasm_file: String,

    /// Application name
    #[arg(long, env = "INPUT_APP_NAME", default_value = "")]
    app_name: String,

    /// Id of an existing application to update
    #[arg(long, env = "INPUT_APP_ID", default_value = "")]
    app_id: String,

    /// Application description
    #[arg(long, env = "INPUT_COMMENT", default_value = "")]
    comment: String,

    /// Environment variables as a JSON object
    #[arg(long, env = "INPUT_ENV", default_value = "")]
    env: String,

    /// Response headers as a JSON object
    #[arg(long, env = "INPUT_RSP_HEADERS", default_value = "")]
    rsp_headers: String,

    /// Secret references as a JSON object of `{"id": n}` values
    #[arg(long, env = "INPUT_SECRETS", default_value = "")]
    secrets: String,
}

impl From<AppArgs> for AppInputs {
    fn from(args: AppArgs) -> Self {
        AppInputs {
            api_key: args.api_key,
            api_url: args.api_url,
            wasm_file: args.wasm_file,
            app_name: args.app_name,
            app_id: args.app_id,
            comment: args.comment,
            env: args.env,
            rsp_headers: args.rsp_headers,
            secrets: args.secrets,
        }
    }
}

#[derive(Args, Debug)]
struct SecretArgs {
    /// API key used for authentication
    #[arg(long, env = "INPUT_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Base URL of the API
    #[arg(long, env = "INPUT_API_URL", default_value = "")]
    api_url: String,

    /// Secret name
    #[arg(long, env = "INPUT_SECRET_NAME", default_value = "")]
    secret_name: String,

    /// Id of an existing secret to update
    #[arg(long, env = "INPUT_SECRET_ID", default_value = "")]
    secret_id: String,

    /// Secret description
    #[arg(long, env = "INPUT_COMMENT", default_value = "")]
    comment: String,

    /// Value stored in slot 0 when no slots are given
    #[arg(long, env = "INPUT_SECRET", default_value = "", hide_env_values = true)]
    secret: String,

    /// Slots as a JSON array of `{"slot": n, "value": "..."}`
    #[arg(long, env = "INPUT_SECRET_SLOTS", default_value = "", hide_env_values = true)]
    secret_slots: String,
}

impl From<SecretArgs> for SecretInputs {
    fn from(args: SecretArgs) -> Self {
        SecretInputs {
            api_key: args.api_key,
            api_url: args.api_url,
            secret_name: args.secret_name,
            secret_id: args.secret_id,
            comment: args.comment,
            secret: args.secret,
            secret_slots: args.secret_slots,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let reporter = WorkflowReporter::from_env();
    match cli.command {
        Command::App(args) => {
            let inputs = AppInputs::from(args);
            run_app(&inputs, &reporter).await;
        }
        Command::Secret(args) => {
            let inputs = SecretInputs::from(args);
            run_secret(&inputs, &reporter).await;
        }
    }

    if reporter.has_failed() {
        process::exit(1);
    }
}
