//! Splits one raw source line into field values.

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Split `line` on commas that are not inside a quoted section.
///
/// Quote characters toggle the quoted state and are dropped from the output;
/// inside a quoted section `""` yields a literal quote. There is no error
/// path: unbalanced quotes simply keep the rest of the line in the current
/// field. The result always has one more element than the number of
/// unquoted commas.
pub fn parse_line(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut fields = Vec::with_capacity(super::row_mapper::COLUMN_COUNT);
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            QUOTE if in_quotes && chars.peek() == Some(&QUOTE) => {
                chars.next();
                current.push(QUOTE);
            }
            QUOTE => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
