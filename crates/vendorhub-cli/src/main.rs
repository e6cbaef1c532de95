// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;
use vendorhub_api::Client;
use vendorhub_app::{AppCommand, AppState, LoginForm, MenuCache};
use vendorhub_store::Store;

const PASSWORD_ENV: &str = "VENDORHUB_PASSWORD";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `vendorhub --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let log_path = config.log_file()?;
    logging::init(&log_path, &config.log_level())?;
    tracing::info!(config = %options.config_path.display(), "starting");

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open settings database {} -- if this path is wrong, set [storage].db_path or VENDORHUB_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    let mut client = Client::new(config.base_url(), config.timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    let menu_ttl = config.menu_cache_ttl()?;
    if options.check_only {
        return Ok(());
    }

    let form = login_form(
        options.email,
        store.last_email()?,
        env::var(PASSWORD_ENV).ok(),
    )?;
    let session = client
        .login(&form.email, &form.password)
        .context("sign in")?;
    client.set_token(Some(session.token.clone()));
    store.put_last_email(&form.email)?;

    let mut state = AppState {
        sidebar_collapsed: store
            .sidebar_collapsed()?
            .unwrap_or_else(|| config.sidebar_collapsed()),
        ..AppState::default()
    };
    state.dispatch(AppCommand::SignedIn(session.user.clone()));

    let mut runtime = ApiRuntime::new(client, session, &store, MenuCache::new(menu_ttl))
        .with_limits(config.page_size(), config.max_upload_bytes());
    let result = vendorhub_tui::run_app(&mut state, &mut runtime);
    tracing::info!(ok = result.is_ok(), "exiting");
    result
}

/// `--email` beats the remembered address. The password only comes from the
/// environment so it never lands in shell history.
fn login_form(
    flag_email: Option<String>,
    last_email: Option<String>,
    password: Option<String>,
) -> Result<LoginForm> {
    let email = flag_email
        .or(last_email)
        .ok_or_else(|| anyhow!("no email to sign in with; pass --email <addr>"))?;
    let password =
        password.ok_or_else(|| anyhow!("set {PASSWORD_ENV} to the account password"))?;
    let form = LoginForm::new(email.trim(), password);
    form.validate().context("invalid sign-in details")?;
    Ok(form)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    check_only: bool,
    email: Option<String>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        check_only: false,
        email: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--email" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--email requires an address"))?;
                options.email = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("vendorhub");
    println!("  --config <path>          Use a specific config path");
    println!("  --email <addr>           Sign in as this account (password from {PASSWORD_ENV})");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved settings database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + settings DB + API client setup");
    println!("  --help                   Show this help");
}
