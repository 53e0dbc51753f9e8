// csv.rs
//
// Minimal RFC 4180 reading and writing: comma separated, `"` quoting with
// doubled quotes inside, CRLF or LF line endings.

pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cur = String::new();
    let mut state = State::FieldStart;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match state {
            State::FieldStart | State::Unquoted => match ch {
                '"' if matches!(state, State::FieldStart) => state = State::Quoted,
                ',' => {
                    record.push(std::mem::take(&mut cur));
                    state = State::FieldStart;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    record.push(std::mem::take(&mut cur));
                    records.push(std::mem::take(&mut record));
                    state = State::FieldStart;
                }
                _ => {
                    cur.push(ch);
                    state = State::Unquoted;
                }
            },
            State::Quoted => match ch {
                '"' => state = State::QuoteInQuoted,
                _ => cur.push(ch),
            },
            State::QuoteInQuoted => match ch {
                '"' => {
                    cur.push('"');
                    state = State::Quoted;
                }
                ',' => {
                    record.push(std::mem::take(&mut cur));
                    state = State::FieldStart;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    record.push(std::mem::take(&mut cur));
                    records.push(std::mem::take(&mut record));
                    state = State::FieldStart;
                }
                _ => {
                    // stray text after a closing quote is kept as-is
                    cur.push(ch);
                    state = State::Unquoted;
                }
            },
        }
    }
    if !cur.is_empty() || !record.is_empty() || matches!(state, State::QuoteInQuoted) {
        record.push(cur);
        records.push(record);
    }
    records
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// One CSV line terminated with CRLF.
pub fn format_record<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_records() {
        assert_eq!(
            parse_records("a,b\r\n1,2\r\n"),
            vec![vec!["a", "b"], vec!["1", "2"]]
        );
        assert_eq!(parse_records("a,b\n1,2"), vec![vec!["a", "b"], vec!["1", "2"]]);
        assert_eq!(parse_records("x,,\n"), vec![vec!["x", "", ""]]);
    }

    #[test]
    fn quoted_fields_keep_separators_and_quotes() {
        assert_eq!(
            parse_records("\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\"\n"),
            vec![vec!["a,b", "say \"hi\"", "two\nlines"]]
        );
        assert_eq!(parse_records("\"\"\n"), vec![vec![""]]);
    }

    #[test]
    fn blank_lines_become_empty_records() {
        assert_eq!(parse_records("a\n\nb\n"), vec![vec!["a"], vec![""], vec!["b"]]);
    }

    #[test]
    fn formatting_quotes_only_when_needed() {
        assert_eq!(format_record(&["a", "b c", "d,e", "f\"g"]), "a,b c,\"d,e\",\"f\"\"g\"\r\n");
        assert_eq!(parse_records(&format_record(&["x,y", "z"])), vec![vec!["x,y", "z"]]);
    }
}
