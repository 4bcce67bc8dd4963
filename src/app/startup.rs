//! Application startup
//!
//! Parses arguments, layers configuration, initialises logging and the
//! shared services, then hands over to the selected command.

use super::cli::api::{initial_color_choice, load_config_file, unknown_keys, Args, Settings};
use super::commands::{run_command, AppContext, EXIT_FAILURE, EXIT_USAGE};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::styles::palette_to_clap;
use crate::core::validation::ValidationError;
use crate::core::version::long_version;
use crate::notifications::api::new_notification_service;
use crate::service::api::HttpProductService;
use crate::store::api::{FileBackend, HistoryStore};
use clap::{CommandFactory, FromArgMatches};
use std::sync::Arc;

/// Level used when neither the config file nor the CLI sets one
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Run the application and return the process exit code
pub async fn startup() -> i32 {
    let argv: Vec<String> = std::env::args().collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(code) => return code,
    };

    let (settings, ignored_keys) = match load_settings(&args).await {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };
    let color = settings.color_enabled();

    if let Err(e) = init_logging(
        Some(settings.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)),
        settings.log_format,
        settings.log_file.as_deref(),
        color,
    ) {
        eprintln!("Error initialising logging: {}", e);
        return EXIT_FAILURE;
    }
    for key in &ignored_keys {
        log::warn!("Ignoring unknown configuration key '{}'", key);
    }
    log::debug!("Effective settings: {:?}", settings);

    let service = match HttpProductService::new(settings.api_url.clone(), settings.request_timeout)
    {
        Ok(service) => service,
        Err(e) => {
            log_error_with_context(&e, "Creating the product service client");
            return EXIT_FAILURE;
        }
    };
    let store = Arc::new(HistoryStore::open(FileBackend::new(&settings.data_dir)));

    let ctx = AppContext {
        settings,
        store: store.clone(),
        service: Arc::new(service),
        notifications: new_notification_service(),
        color,
    };

    let mut stdout = std::io::stdout();
    let code = run_command(&ctx, &args.command, &mut stdout).await;

    let failures = store.persistence_failures();
    if failures > 0 {
        log::warn!(
            "{} write(s) to {} were kept in memory only",
            failures,
            ctx.settings.data_dir.display()
        );
    }
    code
}

/// Parse `argv`, printing help, version or usage errors
///
/// On `Err` the caller exits with the returned code.
pub fn parse_args(argv: &[String]) -> Result<Args, i32> {
    let color = initial_color_choice(argv)
        .unwrap_or_else(|| std::io::IsTerminal::is_terminal(&std::io::stdout()));
    let command = Args::command()
        .long_version(long_version())
        .styles(palette_to_clap(color))
        .color(if color {
            clap::ColorChoice::Always
        } else {
            clap::ColorChoice::Never
        });

    let matches = command.try_get_matches_from(argv).map_err(|e| {
        let _ = e.print();
        e.exit_code()
    })?;
    Args::from_arg_matches(&matches).map_err(|e| {
        let _ = e.print();
        e.exit_code()
    })
}

/// Defaults, then the config file, then command-line flags
///
/// Also returns config keys that were not recognised.
pub async fn load_settings(args: &Args) -> Result<(Settings, Vec<String>), ValidationError> {
    let mut settings = Settings::default();
    let mut ignored = Vec::new();

    if let Some((path, config)) = load_config_file(args.config_file.as_deref()).await? {
        settings.apply_toml_values(&config).map_err(|e| {
            ValidationError::new(&format!(
                "Error in configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        ignored = unknown_keys(&config)
            .into_iter()
            .map(str::to_string)
            .collect();
    }

    settings.apply_args(args)?;
    Ok((settings, ignored))
}
