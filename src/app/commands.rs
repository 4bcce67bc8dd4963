//! Subcommand execution
//!
//! Each runner writes its report to `out` and returns the process exit code.
//! Failures are shown as status text on stderr; details go to the log.

use super::cli::api::{
    render_analytics, render_history, render_product, render_recent, render_session_event,
    render_suggestions, Command, Settings,
};
use super::terminal::{spawn_decoder, TerminalCamera};
use crate::core::error_handling::{status_text, ContextualError};
use crate::core::styles::StyleRole;
use crate::core::validation::validate_barcode;
use crate::notifications::api::{Event, EventFilter, NotificationService, SessionEventType};
use crate::scanner::api::{ControllerConfig, LookupPipeline, ScanSessionController};
use crate::service::api::ProductService;
use crate::store::api::{HistoryStore, PersistOutcome, ProductRecord};
use std::io::Write;
use std::sync::Arc;
use tokio::io::AsyncBufRead;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_INTERRUPTED: i32 = 130;

const SCAN_SUBSCRIBER: &str = "cli:scan";

/// Everything a command needs, built once at startup
pub struct AppContext {
    pub settings: Settings,
    pub store: Arc<HistoryStore>,
    pub service: Arc<dyn ProductService>,
    pub notifications: NotificationService,
    pub color: bool,
}

impl AppContext {
    pub fn lookup_pipeline(&self) -> LookupPipeline {
        LookupPipeline::new(
            self.service.clone(),
            self.store.clone(),
            self.notifications.clone(),
        )
    }
}

pub async fn run_command<W: Write>(ctx: &AppContext, command: &Command, out: &mut W) -> i32 {
    log::debug!("Running '{}'", command.name());
    match command {
        Command::Scan => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_scan(ctx, stdin, out).await
        }
        Command::Lookup { barcode } => run_lookup(ctx, barcode, out).await,
        Command::Suggest { product_name } => run_suggest(ctx, &product_name.join(" "), out).await,
        Command::History { limit } => {
            emit(out, &render_history(&ctx.store.scan_history(), *limit, ctx.color));
            EXIT_OK
        }
        Command::Recent { select: None } => {
            emit(out, &render_recent(&ctx.store.recent_products(), ctx.color));
            EXIT_OK
        }
        Command::Recent {
            select: Some(barcode),
        } => run_select(ctx, barcode, out),
        Command::Show => run_show(ctx, out).await,
        Command::Analytics { top } => {
            emit(
                out,
                &render_analytics(&ctx.store.compute_analytics(), *top, ctx.color),
            );
            EXIT_OK
        }
    }
}

/// One scan session fed by `input`; ends at the first result or failure
pub async fn run_scan<R, W>(ctx: &AppContext, input: R, out: &mut W) -> i32
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: Write,
{
    let camera = TerminalCamera::new();
    let stream_state = camera.stream_state();
    let config = ControllerConfig {
        scan_timeout: ctx.settings.scan_timeout,
    };
    let (handle, controller) =
        ScanSessionController::new(camera, ctx.lookup_pipeline(), config).spawn();
    let decoder = spawn_decoder(input, handle.decode_sender(), stream_state);

    let mut events = handle.subscribe(SCAN_SUBSCRIBER, EventFilter::SessionOnly).await;
    if !handle.start_session().await {
        report_message("Scan session could not be started", ctx.color);
        handle.unsubscribe(SCAN_SUBSCRIBER).await;
        return EXIT_FAILURE;
    }
    eprintln!(
        "{}",
        StyleRole::Dim.paint(
            "Type or paste a barcode and press Enter (Ctrl-C to stop)",
            ctx.color
        )
    );

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let mut permission_shown = false;
    let code = 'session: loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = &mut interrupted => {
                handle.stop_session().await;
                report_message("Scan cancelled", ctx.color);
                break 'session EXIT_INTERRUPTED;
            }
        };

        let session = match event {
            Some(Event::Session(session)) => session,
            Some(Event::Store(_)) => continue,
            None => break 'session EXIT_FAILURE,
        };

        if !permission_shown {
            if let Some(permission) = handle.snapshot().permission {
                emit(out, &StyleRole::Dim.paint(permission.status_text(), ctx.color));
                permission_shown = true;
            }
        }
        if let Some(line) = render_session_event(&session, ctx.color) {
            emit(out, &line);
        }

        match session.event_type {
            SessionEventType::ProductFound => {
                if let Some(product) = &session.product {
                    show_product(ctx, product, out).await;
                }
                break 'session EXIT_OK;
            }
            SessionEventType::LookupFailed | SessionEventType::SessionFailed => {
                break 'session EXIT_FAILURE;
            }
            _ => {}
        }
    };

    decoder.abort();
    if let Some(stats) = handle.unsubscribe(SCAN_SUBSCRIBER).await {
        log::debug!("Scan feed delivered {} events", stats.events_delivered());
    }
    drop(handle);
    if let Err(e) = controller.await {
        log::debug!("Scan controller ended abnormally: {}", e);
    }
    code
}

async fn run_lookup<W: Write>(ctx: &AppContext, barcode: &str, out: &mut W) -> i32 {
    let barcode = match validate_barcode(barcode) {
        Ok(code) => code,
        Err(e) => {
            report(&e, "Barcode validation", ctx.color);
            return EXIT_USAGE;
        }
    };

    match ctx.lookup_pipeline().lookup_and_persist(&barcode).await {
        Ok(product) => {
            show_product(ctx, &product, out).await;
            EXIT_OK
        }
        Err(e) => {
            report(&e, "Product lookup", ctx.color);
            EXIT_FAILURE
        }
    }
}

async fn run_suggest<W: Write>(ctx: &AppContext, product_name: &str, out: &mut W) -> i32 {
    match ctx.service.suggest_alternatives(product_name).await {
        Ok(suggestions) => {
            emit(out, &render_suggestions(&suggestions, ctx.color));
            EXIT_OK
        }
        Err(e) => {
            log::debug!("Suggestions for '{}' failed: {}", product_name, e);
            report_message("Failed to fetch AI powered suggestions", ctx.color);
            EXIT_FAILURE
        }
    }
}

fn run_select<W: Write>(ctx: &AppContext, barcode: &str, out: &mut W) -> i32 {
    let recent = ctx.store.recent_products();
    let product = match recent.iter().find(|p| p.barcode == barcode) {
        Some(product) => product,
        None => {
            report_message(
                &format!("No recently viewed product with barcode {}", barcode),
                ctx.color,
            );
            return EXIT_FAILURE;
        }
    };

    match ctx.store.select_product(product) {
        PersistOutcome::Persisted => {
            emit(
                out,
                &format!(
                    "Selected {}; run `ecoscan show` to view it",
                    StyleRole::Label.paint(product.display_name(), ctx.color)
                ),
            );
            EXIT_OK
        }
        PersistOutcome::MemoryOnly(e) => {
            report(&e, "Saving the selected product", ctx.color);
            EXIT_FAILURE
        }
    }
}

async fn run_show<W: Write>(ctx: &AppContext, out: &mut W) -> i32 {
    match ctx.store.take_selected_product() {
        Some(product) => {
            show_product(ctx, &product, out).await;
            EXIT_OK
        }
        None => {
            report_message(
                "No product selected. Use `ecoscan recent --select <BARCODE>` first.",
                ctx.color,
            );
            EXIT_FAILURE
        }
    }
}

// Detail view followed by alternatives for named products
async fn show_product<W: Write>(ctx: &AppContext, product: &ProductRecord, out: &mut W) {
    emit(out, &render_product(product, ctx.color));

    let name = match &product.product_name {
        Some(name) => name,
        None => {
            emit(out, &render_suggestions(&[], ctx.color));
            return;
        }
    };
    match ctx.service.suggest_alternatives(name).await {
        Ok(suggestions) => emit(out, &render_suggestions(&suggestions, ctx.color)),
        Err(e) => {
            log::debug!("Suggestions for '{}' failed: {}", name, e);
            emit(
                out,
                &format!(
                    "{}\n{}",
                    StyleRole::Header.paint("Alternatives", ctx.color),
                    StyleRole::Error.paint("Failed to fetch AI powered suggestions", ctx.color)
                ),
            );
        }
    }
}

fn emit<W: Write>(out: &mut W, text: &str) {
    let text = text.strip_suffix('\n').unwrap_or(text);
    if let Err(e) = writeln!(out, "{}", text) {
        log::debug!("Could not write output: {}", e);
    }
}

fn report<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    context: &str,
    color: bool,
) {
    log::debug!("{} failed: {:?}", context, error);
    report_message(&status_text(error), color);
}

fn report_message(message: &str, color: bool) {
    eprintln!("{}", StyleRole::Error.paint(message, color));
}
