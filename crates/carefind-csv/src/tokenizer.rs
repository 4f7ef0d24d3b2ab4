//! Splitting one CSV line into fields.

/// Split one line into fields.
///
/// The line is trimmed first. A `""` pair inside a quoted section is a
/// literal quote; any other `"` toggles the quoted state; a `,` outside
/// quotes ends a field. Each field is trimmed, loses a leading byte-order
/// mark, and loses one pair of wrapping quotes if it still has them.
///
/// Never fails: an unbalanced quote just runs to the end of the line.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim().chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(finish_field(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(finish_field(&current));
    fields
}

fn finish_field(raw: &str) -> String {
    let field = raw.trim();
    let field = field.strip_prefix('\u{FEFF}').unwrap_or(field);
    if field.starts_with('"') && field.ends_with('"') {
        // A lone `"` collapses to the empty string.
        field.get(1..field.len() - 1).unwrap_or("").to_string()
    } else {
        field.to_string()
    }
}
