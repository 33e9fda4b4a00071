//! sitecoreai - Main entry point

use clap::Parser;
use log::{debug, info, warn};
use std::process::ExitCode;

use sitecoreai::cli::AuthStatusArgs;
use sitecoreai::output::{output_environment, output_token_status, render_body};
use sitecoreai::ui::{create_spinner, finish_spinner};
use sitecoreai::{
    ApiArgs, ApiClient, AuthCommand, Cli, ClientConfig, ClientError, Command, CredentialResolver,
    Method, WaitEnvArgs,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting sitecoreai v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ClientError::RequestFailed { status, response }) => {
            debug!("Request failed with status {}", status);
            let body = render_body(&response);
            if body.trim().is_empty() {
                eprintln!("Error: {} returned status {}", response.url, status);
            } else {
                eprintln!("{}", body);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> sitecoreai::Result<()> {
    debug!(
        "CLI args: cli_config={:?}, base_url={:?}, auth_url={:?}, proxy={:?}",
        cli.cli_config, cli.base_url, cli.auth_url, cli.proxy
    );

    let mut resolver = CredentialResolver::new();
    match std::env::current_dir() {
        Ok(dir) => resolver = resolver.search_from(dir),
        Err(e) => warn!("Cannot read current directory, skipping CLI session search: {}", e),
    }

    let strategy = resolver.resolve(
        cli.client_id.as_deref(),
        cli.client_secret.as_deref(),
        cli.token.as_deref(),
        cli.cli_config.as_deref(),
    )?;

    let mut config = ClientConfig::new();
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(url) = cli.auth_url {
        config = config.with_auth_url(url);
    }
    if let Some(proxy) = cli.proxy {
        config = config.with_proxy(proxy);
    }

    let client = ApiClient::new(&config, strategy)?;

    match cli.command {
        Command::Auth(AuthCommand::Status(args)) => run_auth_status(&client, &args).await,
        Command::Auth(AuthCommand::Token) => {
            println!("{}", client.bearer_token().await?);
            Ok(())
        }
        Command::Api(args) => run_api(&client, &args).await,
        Command::WaitEnv(args) => run_wait_env(&client, &args).await,
    }
}

async fn run_auth_status(client: &ApiClient, args: &AuthStatusArgs) -> sitecoreai::Result<()> {
    client.authenticate().await?;
    let status = client.token_status().await;
    output_token_status(&status, &args.output);
    Ok(())
}

async fn run_api(client: &ApiClient, args: &ApiArgs) -> sitecoreai::Result<()> {
    let method = Method::from(args.method);
    let body: Option<serde_json::Value> = match &args.data {
        Some(data) => Some(serde_json::from_str(data).map_err(|e| {
            ClientError::Serialization(format!("--data is not valid JSON: {}", e))
        })?),
        None => None,
    };

    let response = client.do_request(method, &args.path, body.as_ref()).await?;
    debug!("{} {} -> {}", args.method, response.url, response.status);

    if !response.body.is_empty() {
        println!("{}", render_body(&response));
    }
    Ok(())
}

async fn run_wait_env(client: &ApiClient, args: &WaitEnvArgs) -> sitecoreai::Result<()> {
    let spinner = create_spinner(
        &format!("Waiting for environment {} to be ready...", args.environment_id),
        args.quiet,
    );

    let result = client
        .wait_for_environment_ready(&args.environment_id, args.timeout_minutes)
        .await;

    match result {
        Ok(environment) => {
            let done = format!("Environment {} is ready", args.environment_id);
            finish_spinner(spinner, Some(done.as_str()));
            output_environment(&environment);
            Ok(())
        }
        Err(e) => {
            finish_spinner(spinner, None);
            Err(e)
        }
    }
}
