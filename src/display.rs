use crate::config::{ReportConfig, builtin_template_names};
use crate::field::OverlaySession;
use crate::filter_object::{FilterObject, FilterValue};
use crate::pane::PaneState;
use crate::range::{EncodedRangeToken, RangeFilter};
use crate::saved::ApplyOutcome;
use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde_json::{Value, json};
use std::fmt::Write as _;

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

fn value_text(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(text) if text.is_empty() => "\"\"".to_string(),
        FilterValue::Text(text) => text.clone(),
        FilterValue::List(items) if items.is_empty() => "[]".to_string(),
        FilterValue::Other(other) => other.to_string(),
        list => list.labels().join(", "),
    }
}

pub fn format_filters_table(filters: &FilterObject) -> Table {
    let mut table = create_styled_table(&["Field", "Value"]);
    for (key, value) in filters.iter() {
        table.add_row(vec![Cell::new(key), Cell::new(value_text(value))]);
    }
    table
}

pub fn format_range_text(token: &EncodedRangeToken, filter: Option<&RangeFilter>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Token:       {}", token.as_str().bold());
    match filter {
        Some(filter) => {
            let comparator = filter.comparator();
            let _ = writeln!(
                out,
                "Comparator:  {} ({})",
                comparator.code().green(),
                comparator.label()
            );
            let _ = writeln!(out, "Operand 1:   {}", filter.operand1());
            if let Some(operand2) = filter.operand2() {
                let _ = writeln!(out, "Operand 2:   {}", operand2);
            }
        }
        None => {
            let _ = writeln!(out, "{}", "No range filter set".yellow());
        }
    }
    out
}

pub fn format_range_json(token: &EncodedRangeToken, filter: Option<&RangeFilter>) -> String {
    to_pretty(&json!({
        "token": token,
        "filter": filter,
    }))
}

pub fn format_pane_text(pane_id: &str, pane: &PaneState, filters: &FilterObject) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("PANE {pane_id}").bold().bright_white());
    let _ = writeln!(out);

    let mut fields = create_styled_table(&["Field", "Summary"]);
    for (id, summary) in pane.summary() {
        fields.add_row(vec![Cell::new(id), Cell::new(summary)]);
    }
    let _ = writeln!(out, "{fields}");
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", "Filters".bold());
    if filters.is_empty() {
        let _ = writeln!(out, "  (none)");
    } else {
        let _ = writeln!(out, "{}", format_filters_table(filters));
    }
    out
}

fn pane_value(pane_id: &str, pane: &PaneState, filters: &FilterObject) -> Value {
    let summary: serde_json::Map<String, Value> = pane
        .summary()
        .into_iter()
        .map(|(id, text)| (id, Value::String(text)))
        .collect();
    json!({
        "pane": pane_id,
        "summary": summary,
        "filters": filters,
    })
}

pub fn format_pane_json(pane_id: &str, pane: &PaneState, filters: &FilterObject) -> String {
    to_pretty(&pane_value(pane_id, pane, filters))
}

pub fn format_apply_text(
    pane_id: &str,
    name: Option<&str>,
    outcome: &ApplyOutcome,
    pane: &PaneState,
    filters: &FilterObject,
) -> String {
    let mut out = String::new();
    if outcome.reset_only {
        let _ = writeln!(out, "{}", "No saved set selected; pane reset to defaults".yellow());
    } else {
        let _ = writeln!(
            out,
            "Applied saved set {}",
            name.unwrap_or_default().green().bold()
        );
        if !outcome.applied.is_empty() {
            let _ = writeln!(out, "  fields:  {}", outcome.applied.join(", "));
        }
        if !outcome.ignored.is_empty() {
            let _ = writeln!(out, "  ignored: {}", outcome.ignored.join(", ").yellow());
        }
    }
    let _ = writeln!(out);
    out.push_str(&format_pane_text(pane_id, pane, filters));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Saved-key mirror".bold());
    let _ = writeln!(out, "{}", format_filters_table(pane.filter_object()));
    out
}

pub fn format_apply_json(
    pane_id: &str,
    outcome: &ApplyOutcome,
    pane: &PaneState,
    filters: &FilterObject,
) -> String {
    let mut value = pane_value(pane_id, pane, filters);
    value["outcome"] = json!(outcome);
    value["mirror"] = json!(pane.filter_object());
    to_pretty(&value)
}

pub fn format_options_text(session: &OverlaySession) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", session.title.bold(), session.field_id);
    if session.options.is_empty() {
        let _ = writeln!(out, "  {}", "no options".yellow());
        return out;
    }

    let mut table = create_styled_table(&["Option", "Id", "Selected"]);
    for option in &session.options {
        let selected = session
            .preselected
            .iter()
            .any(|p| *p == option.label || Some(p.as_str()) == option.id.as_deref());
        table.add_row(vec![
            Cell::new(&option.label),
            Cell::new(option.id.as_deref().unwrap_or("")),
            Cell::new(if selected { "yes" } else { "" }),
        ]);
    }
    let _ = writeln!(out, "{table}");
    out
}

pub fn format_options_json(session: &OverlaySession) -> String {
    to_pretty(&json!(session))
}

/// Options of a saved overlay plus the pane it changed
pub fn format_selection_json(
    session: &OverlaySession,
    pane_id: &str,
    pane: &PaneState,
    filters: &FilterObject,
) -> String {
    let mut value = pane_value(pane_id, pane, filters);
    value["overlay"] = json!(session);
    to_pretty(&value)
}

pub fn format_panes_text(config: &ReportConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Profile: {}", config.profile_name.bold());
    let mut table = create_styled_table(&["Pane", "Ranges", "Selections"]);
    for pane in &config.panes {
        table.add_row(vec![
            Cell::new(&pane.id),
            Cell::new(pane.ranges.len()),
            Cell::new(pane.selections.len()),
        ]);
    }
    let _ = writeln!(out, "{table}");
    let _ = writeln!(
        out,
        "Built-in templates: {}",
        builtin_template_names().join(", ")
    );
    out
}

pub fn format_panes_json(config: &ReportConfig) -> String {
    to_pretty(&json!({
        "profile_name": config.profile_name,
        "panes": config.pane_ids(),
        "templates": builtin_template_names(),
    }))
}

fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| "{\"error\":\"failed to serialize output\"}".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{Comparator, decode, encode};

    #[test]
    fn test_value_text_shapes() {
        assert_eq!(value_text(&FilterValue::Text(String::new())), "\"\"");
        assert_eq!(value_text(&FilterValue::List(Vec::new())), "[]");
        assert_eq!(
            value_text(&FilterValue::from(vec!["East", "West"])),
            "East, West"
        );
    }

    #[test]
    fn test_range_json_has_token_and_filter() {
        let filter = RangeFilter::single(Comparator::After, "2024-12-31");
        let token = encode(&filter);
        let filter = decode(token.as_str());
        let out: Value =
            serde_json::from_str(&format_range_json(&token, filter.as_ref())).unwrap();
        assert_eq!(out["token"], "2024-12-31AF");
        assert_eq!(out["filter"]["comparator"], "AF");
    }

    #[test]
    fn test_range_text_without_filter() {
        let token = EncodedRangeToken::from("");
        let out = format_range_text(&token, None);
        assert!(out.contains("No range filter set"));
    }
}
