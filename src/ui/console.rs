//! Plain-text rendering of request state for the console shell.

use crate::domain::{RequestState, ServiceInfo, ValidationReport};

pub fn format_price(value: f64) -> String {
    format!("${value:.2}")
}

pub fn render_state(state: &RequestState) -> String {
    match state {
        RequestState::Idle => "No prediction yet. Submit the form to see results.".to_string(),
        RequestState::Submitting => "Fetching predictions...".to_string(),
        RequestState::Succeeded(result) => {
            let mut lines = vec!["Model Predictions".to_string()];
            if let Some(fruit) = &result.matched_fruit {
                lines.push(format!("  Matched fruit: {fruit}"));
            }
            let estimates = result.estimates();
            let width = estimates
                .iter()
                .map(|estimate| estimate.label.len())
                .max()
                .unwrap_or(0);
            lines.extend(estimates.iter().map(|estimate| {
                let row = format!(
                    "  {label:<width$}  {price:>10}",
                    label = estimate.label,
                    price = format_price(estimate.value),
                );
                match estimate.description {
                    Some(description) => format!("{row}  ({description})"),
                    None => row,
                }
            }));
            lines.push("Predictions are estimates. Validate before production.".to_string());
            lines.join("\n")
        }
        RequestState::Failed(reason) => format!("Prediction failed: {}", reason.user_message()),
    }
}

/// Header line followed by one `  - item` line per entry.
fn bullet_list<I>(header: &str, items: I) -> String
where
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    std::iter::once(header.to_string())
        .chain(items.into_iter().map(|item| format!("  - {item}")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_validation(report: &ValidationReport) -> String {
    bullet_list("Please fix the following fields:", report.errors())
}

pub fn render_fruits(fruits: &[String]) -> String {
    if fruits.is_empty() {
        return "The service reported no fruits.".to_string();
    }
    bullet_list("Available fruits:", fruits)
}

pub fn render_service_info(info: &ServiceInfo) -> String {
    let mut lines = vec![info.message.clone()];
    if !info.models.is_empty() {
        lines.push(format!("Models: {}", info.models.join(", ")));
    }
    if let Some(endpoint) = &info.fruits_endpoint {
        lines.push(format!("Fruits endpoint: {endpoint}"));
    }
    lines.join("\n")
}
