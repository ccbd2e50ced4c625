//! Quote-aware CSV line splitting and cell cleanup

/// Split one CSV line into trimmed fields
///
/// Every `"` toggles the inside-quotes state; commas inside quotes are part
/// of the field. Quote characters are kept, [`clean_value`] strips them.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Normalize a raw cell: empty, `""` and whitespace-only become `None`,
/// otherwise surrounding quotes are stripped and the rest trimmed
pub fn clean_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "\"\"" {
        return None;
    }

    let unquoted = trimmed.trim_matches('"').trim();
    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}
