//! zaik - terminal client for the Zaik text adventure
//!
//! The game itself runs on the Zaik backend. This client starts a session,
//! sends each command line to it and shows the replies in a scrolling
//! transcript.
//!
//! # Quick Start
//!
//! ```text
//! zaik                                # Backend on http://localhost:8000
//! zaik -u https://zaik.example.com    # Remote backend
//! echo look | zaik --plain            # Line mode, for scripts
//! ```
//!
//! # Keybindings
//!
//! | Key | Action |
//! |-----|--------|
//! | Enter | Send command |
//! | PgUp/PgDn | Scroll transcript |
//! | Ctrl+End | Back to newest entry |
//! | Ctrl+N | New game |
//! | Ctrl+V | Paste |
//! | Esc / Ctrl+C / Ctrl+D | Quit |

mod api;
mod app;
mod config;
mod core;
mod plain;
mod ui;

use std::env;
use std::io::IsTerminal;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::HttpBackend;
use crate::app::App;
use crate::config::{ColorScheme, Config};
use crate::core::SessionDriver;
use crate::ui::Renderer;

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options given on the command line (override the config file)
#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    base_url: Option<String>,
    adventure_id: Option<String>,
    player_name: Option<String>,
    timeout_secs: Option<u64>,
    color_scheme: Option<String>,
    plain: bool,
    help: bool,
    version: bool,
}

impl CliOptions {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(id) = &self.adventure_id {
            config.adventure_id = id.clone();
        }
        if let Some(name) = &self.player_name {
            config.player_name = Some(name.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(scheme) = &self.color_scheme {
            config.color_scheme = scheme.clone();
        }
    }
}

fn print_version() {
    eprintln!("zaik {}", VERSION);
}

fn print_help() {
    eprintln!("zaik {} - terminal client for the Zaik text adventure", VERSION);
    eprintln!();
    eprintln!("Usage: zaik [OPTIONS]");
    eprintln!();
    eprintln!("Backend options:");
    eprintln!("  -u, --url <URL>       Backend base address (default: {})", config::DEFAULT_BASE_URL);
    eprintln!("  -a, --adventure <ID>  Adventure to start (default: {})", config::DEFAULT_ADVENTURE);
    eprintln!("      --name <PLAYER>   Player name for the new session");
    eprintln!("      --timeout <SECS>  Per-request timeout (default: 30, no retries)");
    eprintln!();
    eprintln!("Display options:");
    eprintln!("      --theme <NAME>    Color scheme");
    eprintln!("      --plain           Line mode: read commands from stdin");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Enter                 Send command");
    eprintln!("  PgUp/PgDn             Scroll transcript");
    eprintln!("  Ctrl+End              Back to newest entry");
    eprintln!("  Ctrl+N                New game");
    eprintln!("  Ctrl+V                Paste from clipboard");
    eprintln!("  Esc, Ctrl+C, Ctrl+D   Quit");
    eprintln!();
    eprintln!("Configuration: ~/.zaik/config.toml");
    eprintln!("Environment:   ZAIK_API_URL, ZAIK_ADVENTURE, ZAIK_LOG");
    eprintln!("Color schemes: {}", ColorScheme::list().join(", "));
}

fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("Missing value for {}", name))
        };
        match arg.as_str() {
            "-h" | "--help" => opts.help = true,
            "-v" | "--version" => opts.version = true,
            "-u" | "--url" => opts.base_url = Some(value(arg.as_str())?),
            "-a" | "--adventure" => opts.adventure_id = Some(value(arg.as_str())?),
            "--name" => opts.player_name = Some(value(arg.as_str())?),
            "--theme" => opts.color_scheme = Some(value(arg.as_str())?),
            "--timeout" => {
                let raw = value(arg.as_str())?;
                let secs = raw
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid timeout: {}", raw))?;
                opts.timeout_secs = Some(secs);
            }
            "--plain" => opts.plain = true,
            other => {
                return Err(format!("Unknown argument: {}. Use -h for help.", other));
            }
        }
    }

    Ok(opts)
}

/// Log to `~/.zaik/zaik.log`; stdout belongs to the transcript
fn init_logging() {
    let log_path = Config::data_dir()
        .map(|dir| dir.join("zaik.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("zaik.log"));

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("ZAIK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let opts = match parse_args(env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };
    if opts.help {
        print_help();
        return Ok(());
    }
    if opts.version {
        print_version();
        return Ok(());
    }

    init_logging();
    info!("zaik {} starting...", VERSION);

    // CLI > environment > config file > defaults
    let mut config = Config::load();
    config.apply_env();
    opts.apply(&mut config);
    config.validate()?;

    info!("Backend: {}", config.base_url);
    info!("Adventure: {}", config.adventure_id);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let backend = HttpBackend::new(&config.base_url, config.request_timeout())?;
    let settings = config.session_settings();

    if opts.plain || !std::io::stdout().is_terminal() {
        let mut driver = SessionDriver::new(backend, settings);
        return runtime.block_on(plain::run(&mut driver));
    }

    let mut app = App::new(
        Arc::new(backend),
        settings,
        runtime.handle().clone(),
        config.loading_frame(),
    );
    let mut renderer = Renderer::new(config.get_color_scheme(), config.status_bar.visible);
    renderer.init()?;

    let result = app.run(&mut renderer);

    // Restore the terminal before anything is printed
    let _ = renderer.cleanup();
    if let Err(e) = &result {
        error!("Terminal loop failed: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let opts = parse_args(args(&[
            "-u", "http://10.0.0.2:8000", "--adventure", "haunted", "--timeout", "5", "--plain",
        ]))
        .unwrap();
        assert_eq!(opts.base_url.as_deref(), Some("http://10.0.0.2:8000"));
        assert_eq!(opts.adventure_id.as_deref(), Some("haunted"));
        assert_eq!(opts.timeout_secs, Some(5));
        assert!(opts.plain);

        assert_eq!(parse_args(Vec::new()).unwrap(), CliOptions::default());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&["--url"])).is_err());
        assert!(parse_args(args(&["--timeout", "soon"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = Config::default();
        let opts = parse_args(args(&["--name", "Ada", "--theme", "nord", "--timeout", "0"])).unwrap();
        opts.apply(&mut config);
        assert_eq!(config.player_name.as_deref(), Some("Ada"));
        assert_eq!(config.color_scheme, "nord");
        assert!(config.validate().is_err());
    }
}
