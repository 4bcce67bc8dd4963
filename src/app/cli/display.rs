//! Terminal rendering for products, history and analytics
//!
//! Every function returns the text instead of printing it so output can be
//! checked in tests; colour is applied only when `color` is set.

use crate::core::styles::StyleRole;
use crate::notifications::api::{SessionEvent, SessionEventType};
use crate::service::api::Suggestion;
use crate::store::api::{Analytics, ProductRecord, ScanEvent, UNKNOWN_PRODUCT};
use chrono::{Local, TimeZone};
use std::fmt::Write;

/// Ranked product names longer than this are cut and suffixed with "..."
pub const RANKED_NAME_WIDTH: usize = 20;

const NOT_AVAILABLE: &str = "N/A";

/// Detail view of one product
pub fn render_product(product: &ProductRecord, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", StyleRole::Header.paint(product.display_name(), color));
    let _ = writeln!(
        out,
        "{}",
        StyleRole::Dim.paint(
            &format!("Brand: {}", product.brand.as_deref().unwrap_or("Unknown")),
            color
        )
    );
    match &product.image_url {
        Some(url) => {
            let _ = writeln!(out, "{}", StyleRole::Dim.paint(url, color));
        }
        None => {
            let _ = writeln!(out, "{}", StyleRole::Dim.paint("No Image", color));
        }
    }
    out.push('\n');

    let fields: [(&str, String, StyleRole); 8] = [
        ("Barcode", product.barcode.clone(), StyleRole::Value),
        (
            "Nutri-Score",
            or_na(product.nutriscore.as_deref()),
            StyleRole::Value,
        ),
        (
            "Eco Grade",
            or_na(product.eco_grade.as_deref()),
            StyleRole::Value,
        ),
        (
            "Eco Score",
            product.eco_score.map(format_number).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            StyleRole::Value,
        ),
        (
            "Carbon (kg)",
            format!("{:.2}", product.carbon_emission_kg),
            StyleRole::Value,
        ),
        (
            "Recyclable",
            if product.recyclable { "Yes ♻️" } else { "No" }.to_string(),
            if product.recyclable {
                StyleRole::Good
            } else {
                StyleRole::Value
            },
        ),
        (
            "Packaging",
            product.packaging.as_deref().unwrap_or("Unknown").to_string(),
            StyleRole::Value,
        ),
        (
            "Overall Sustainability Score",
            score_text(product.overall_sustainability_score),
            StyleRole::for_score(product.overall_sustainability_score),
        ),
    ];

    let width = fields.iter().map(|(label, _, _)| label.len()).max().unwrap_or(0) + 1;
    for (label, value, role) in fields.iter() {
        let padded = format!("{:<width$}", format!("{}:", label), width = width);
        let _ = writeln!(
            out,
            "  {} {}",
            StyleRole::Label.paint(&padded, color),
            role.paint(value, color)
        );
    }
    out
}

/// Alternatives section of the detail view
pub fn render_suggestions(suggestions: &[Suggestion], color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", StyleRole::Header.paint("Alternatives", color));
    if suggestions.is_empty() {
        let _ = writeln!(out, "{}", StyleRole::Dim.paint("No suggestions available.", color));
        return out;
    }
    for alt in suggestions {
        let _ = writeln!(out, "  {}", StyleRole::Label.paint(&alt.name, color));
        if !alt.reason.is_empty() {
            let _ = writeln!(out, "    {}", alt.reason);
        }
        let _ = writeln!(
            out,
            "    {}",
            StyleRole::Dim.paint(&format!("Brand: {}", alt.brand), color)
        );
    }
    out
}

/// Scan history, newest first, in the local time zone
pub fn render_history(events: &[ScanEvent], limit: Option<usize>, color: bool) -> String {
    render_history_in(events, limit, color, &Local)
}

pub fn render_history_in<Tz: TimeZone>(
    events: &[ScanEvent],
    limit: Option<usize>,
    color: bool,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{}", StyleRole::Header.paint("Scan History", color));
    if events.is_empty() {
        let _ = writeln!(out, "{}", StyleRole::Dim.paint("No scans yet", color));
        return out;
    }

    let shown = limit.unwrap_or(events.len());
    for event in events.iter().rev().take(shown) {
        let when = tz
            .timestamp_millis_opt(event.timestamp)
            .earliest()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "????-??-?? ??:??".to_string());
        let _ = writeln!(
            out,
            "  {}  {:<14} {}  {}",
            StyleRole::Dim.paint(&when, color),
            event.barcode,
            event.product_name,
            StyleRole::for_score(event.sustainability_score)
                .paint(&score_text(event.sustainability_score), color)
        );
    }
    if events.len() > shown {
        let _ = writeln!(
            out,
            "{}",
            StyleRole::Dim.paint(&format!("({} older scans not shown)", events.len() - shown), color)
        );
    }
    out
}

/// Recently viewed products, most recent first
pub fn render_recent(products: &[ProductRecord], color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", StyleRole::Header.paint("Recently Viewed", color));
    if products.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            StyleRole::Dim.paint("No recent products yet. Scan something to get started.", color)
        );
        return out;
    }
    for product in products {
        let _ = writeln!(
            out,
            "  {}  {}  {}",
            StyleRole::Label.paint(product.product_name.as_deref().unwrap_or(UNKNOWN_PRODUCT), color),
            StyleRole::Dim.paint(product.brand.as_deref().unwrap_or("No Brand Info"), color),
            StyleRole::Literal.paint(&product.barcode, color)
        );
    }
    out
}

/// Usage analytics with the first `top` ranked products
pub fn render_analytics(analytics: &Analytics, top: usize, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", StyleRole::Header.paint("User Usage Analytics", color));
    let _ = writeln!(
        out,
        "{} {}",
        StyleRole::Label.paint("Total Scans:", color),
        analytics.total_scans
    );

    let _ = writeln!(out, "{}", StyleRole::Label.paint("Scans Over Time:", color));
    if analytics.scans_by_date.is_empty() {
        let _ = writeln!(out, "  {}", StyleRole::Dim.paint("No scans yet", color));
    } else {
        for (date, count) in &analytics.scans_by_date {
            let _ = writeln!(out, "  {}  {}", date.format("%Y-%m-%d"), count);
        }
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "{}",
        StyleRole::Header.paint("Scanned Products Range (By Sustainability Score)", color)
    );
    if let Some(best) = &analytics.most_sustainable_product {
        let _ = writeln!(
            out,
            "{} {} (Score: {})",
            StyleRole::Good.paint("✨ Most Sustainable Product:", color),
            best.product_name,
            score_text(best.sustainability_score)
        );
    }
    let ranked = analytics.top_ranked(top);
    if ranked.is_empty() {
        let _ = writeln!(out, "  {}", StyleRole::Dim.paint("No scans yet", color));
    }
    for (index, event) in ranked.iter().enumerate() {
        let name = truncate_name(&event.product_name, RANKED_NAME_WIDTH);
        let _ = writeln!(
            out,
            "  {:>2}. {:<width$}  {}",
            index + 1,
            name,
            StyleRole::for_score(event.sustainability_score)
                .paint(&score_text(event.sustainability_score), color),
            width = RANKED_NAME_WIDTH + 3
        );
    }
    out
}

/// One status line for a session notification; `None` for events shown elsewhere
pub fn render_session_event(event: &SessionEvent, color: bool) -> Option<String> {
    match event.event_type {
        SessionEventType::StateChanged => {
            Some(StyleRole::Dim.paint(event.state.status_text(), color))
        }
        SessionEventType::CodeAccepted => event.barcode.as_ref().map(|code| {
            format!(
                "{} {}",
                StyleRole::Good.paint("Barcode detected:", color),
                StyleRole::Literal.paint(code, color)
            )
        }),
        SessionEventType::LookupFailed | SessionEventType::SessionFailed => event
            .message
            .as_ref()
            .map(|msg| StyleRole::Error.paint(msg, color)),
        SessionEventType::ProductFound => None,
    }
}

/// Cut `name` to `width` characters, marking the cut with "..."
pub fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let head: String = name.chars().take(width).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn score_text(score: Option<f64>) -> String {
    score.map(format_number).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

// 72 -> "72", 72.5 -> "72.5"
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
