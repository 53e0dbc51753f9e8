// table.rs

use itertools::Itertools;

fn line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
        .join(" | ")
}

/// Left-aligned columns joined by ` | `, with a `-+-` rule under the
/// headers. Widths count chars, not bytes.
pub fn pretty_table<S: AsRef<str>>(rows: &[Vec<S>], headers: &[&str]) -> String {
    if rows.is_empty() && headers.is_empty() {
        return "(empty)".to_string();
    }
    let cols = if headers.is_empty() {
        rows.first().map_or(0, Vec::len)
    } else {
        headers.len()
    };
    let mut widths = vec![0; cols];
    let cells = headers
        .iter()
        .copied()
        .enumerate()
        .chain(rows.iter().flat_map(|r| r.iter().map(|c| c.as_ref()).enumerate()));
    for (i, cell) in cells {
        if let Some(w) = widths.get_mut(i) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if !headers.is_empty() {
        lines.push(line(headers.iter().copied(), &widths));
        lines.push(widths.iter().map(|&w| "-".repeat(w)).join("-+-"));
    }
    for row in rows {
        lines.push(line(row.iter().map(|c| c.as_ref()), &widths));
    }
    lines.join("\n")
}
