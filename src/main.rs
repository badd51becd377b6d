use std::{
    io::{self, Write},
    path::Path,
    sync::Arc,
};

use env_logger::Env;
use fetchcache::{
    cache,
    cli::parse_cli,
    config::{Config, ConfigProperties},
    defaults::CONFIG_PATH,
    display,
    error::failed_response,
    http::{Client, NetworkTransport},
    Result,
};

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_path(path);
    }
    // Fall back to the user config if there is one.
    match std::env::var("HOME") {
        Ok(home_dir) => {
            let config_file = Path::new(&home_dir).join(CONFIG_PATH);
            if config_file.exists() {
                Config::from_path(config_file)
            } else {
                Ok(Config::default())
            }
        }
        Err(_) => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    let cli_args = parse_cli()?;
    if cli_args.verbose {
        let env = Env::default().default_filter_or("info");
        env_logger::init_from_env(env);
    }
    let config: Arc<dyn ConfigProperties> = Arc::new(load_config(cli_args.config.as_deref())?);
    let handler = cli_args
        .fetch
        .success_data_handler
        .unwrap_or_else(|| config.default_success_data_handler());
    let store = cache::initialize()?;
    let client = Client::new(NetworkTransport::new(config.as_ref()), store.clone(), config);

    let mut stdout = io::stdout().lock();
    for url in &cli_args.urls {
        match client.fetch(
            cli_args.method,
            url,
            Some(cli_args.request.clone()),
            Some(cli_args.fetch),
        ) {
            Ok(fetched) => display::print(&mut stdout, url, &fetched, handler)?,
            Err(err) => {
                if let Some(response) = failed_response(&err) {
                    eprintln!("{} [network {}]", url, response.status);
                    eprintln!("{}", response.text());
                }
                return Err(err);
            }
        }
    }
    if cli_args.dump_cache {
        let snapshot = serde_json::to_string_pretty(&store.snapshot())?;
        writeln!(stdout, "{snapshot}")?;
    }
    Ok(())
}
