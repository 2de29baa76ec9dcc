// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use log::info;
use runtime::{HttpRuntime, STATE_FILE};
use scriptorium_api::Client;
use scriptorium_app::{AppState, Route};
use scriptorium_testkit::{CatalogFaker, MockApi};
use std::env;
use std::path::PathBuf;

const DEMO_SEED: u64 = 1302;
const DEMO_EXTRA_ARTICLES: usize = 24;

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
            "load config {}; run `scriptorium --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let log_dir = config.log_dir()?;
    logging::init_logging(&config.log_level(), &log_dir).with_context(|| {
        format!(
            "start logging in {}; set [log].dir to a writable directory",
            log_dir.display()
        )
    })?;

    let start_route = match &options.route {
        Some(path) => Some(Route::parse(path).ok_or_else(|| {
            anyhow!("unknown route {path:?}; expected e.g. /articles or /work-details/42")
        })?),
        None => None,
    };

    // Keeps the fixture server alive for the whole session.
    let demo_api = if options.demo {
        let catalog = CatalogFaker::new(DEMO_SEED).catalog(DEMO_EXTRA_ARTICLES);
        let api = MockApi::start(catalog).context("start demo catalog server")?;
        info!("event=demo_api_started base_url={}", api.base_url());
        Some(api)
    } else {
        None
    };

    let base_url = match (&demo_api, &options.api_url) {
        (Some(api), _) => api.base_url().to_owned(),
        (None, Some(url)) => url.clone(),
        (None, None) => config.api_base_url(),
    };
    let client = Client::new(&base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout or pass --api-url",
            options.config_path.display()
        )
    })?;
    info!(
        "event=api_configured base_url={} timeout_ms={}",
        client.base_url(),
        client.timeout().as_millis()
    );

    if options.check_only {
        let count = client.ping()?;
        println!(
            "ok: {} reachable ({count} articles), logging to {}",
            client.base_url(),
            log_dir.display()
        );
        return Ok(());
    }

    let state_path = config::data_dir()?.join(STATE_FILE);
    let theme = runtime::load_theme(&state_path).unwrap_or_else(|| config.theme());
    let mut state = AppState::with_theme(theme);
    if let Some(route) = start_route {
        state.route = route;
    }

    let mut runtime = HttpRuntime::new(client, state_path, config.export_dir());
    let result = scriptorium_tui::run_app(&mut state, &mut runtime);
    drop(demo_api);
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    api_url: Option<String>,
    route: Option<String>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        api_url: None,
        route: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
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
            "--api-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--api-url requires a URL"))?;
                config::validate_base_url(value.as_ref()).context("invalid --api-url")?;
                options.api_url = Some(value.as_ref().trim().to_owned());
            }
            "--route" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--route requires a path such as /articles"))?;
                options.route = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
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
    println!("scriptorium");
    println!("  --config <path>          Use a specific config path");
    println!("  --api-url <url>          Catalog API base URL (overrides config and env)");
    println!("  --route <path>           Start on a route, e.g. /works or /author-details/7");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Browse a built-in sample catalog");
    println!("  --check                  Validate config, logging and API reachability");
    println!("  --help                   Show this help");
}
