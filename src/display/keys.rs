//! Scraper key status formatting

use crate::keys::KeyStatus;

/// Format the registry status with one line per key
pub fn format_key_status(status: &KeyStatus) -> String {
    let mut output = String::new();

    output.push_str(&format!("Keys:              {} ({} active)\n", status.total, status.active));
    output.push_str(&format!("Total usage:       {}\n", status.total_usage));
    output.push_str(&format!("Available credits: {}\n", status.available_credits));
    output.push_str(&format!("Usage:             {}\n", status.usage_percent));

    if status.keys.is_empty() {
        output.push_str("\nNo keys registered.\n");
        return output;
    }

    output.push('\n');
    output.push_str(&format!(
        "{:<12}  {:>6}  {:<8}  {:>8}  {}\n",
        "Key", "Usage", "Status", "Credits", "Last validated"
    ));
    output.push_str(&format!(
        "{:-<12}  {:->6}  {:-<8}  {:->8}  {:-<16}\n",
        "", "", "", "", ""
    ));

    for key in &status.keys {
        output.push_str(&format!(
            "{:<12}  {:>6}  {:<8}  {:>8}  {}\n",
            key.key,
            key.usage,
            if key.active { "active" } else { "inactive" },
            key.real_credits
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            key.last_validated
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
        ));
    }

    output
}
