// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain-text table rendering.

use std::fmt::Write as _;

use wrangle_core::Table;

/// Renders up to `max_rows` rows as an aligned text grid, with a header row
/// of `name <type>` labels and a trailer counting elided rows.
pub(crate) fn render(table: &Table, max_rows: usize) -> String {
    let shown = table.row_count().min(max_rows);
    let headers: Vec<String> = table
        .columns()
        .iter()
        .map(|c| format!("{} <{}>", c.name(), c.dtype()))
        .collect();
    let cells: Vec<Vec<String>> = (0..shown)
        .map(|row| {
            table
                .columns()
                .iter()
                .map(|c| c.values()[row].to_string())
                .collect()
        })
        .collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].len())
                .chain([h.len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let mut line = |fields: &[String]| {
        let padded: Vec<String> = fields
            .iter()
            .zip(&widths)
            .map(|(f, w)| format!("{f:>w$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(&headers);
    for row in &cells {
        line(row);
    }
    if shown < table.row_count() {
        let _ = writeln!(out, "# ... with {} more rows", table.row_count() - shown);
    }
    out
}

#[cfg(test)]
mod tests {
    use wrangle_core::table;

    use super::*;

    #[test]
    fn aligns_and_elides() {
        let t = table! { "a" => [1, 22, 333], "b" => [Some("x"), None, Some("z")] }.unwrap();
        let text = render(&t, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a <int>  b <str>");
        assert_eq!(lines[1], "      1        x");
        assert_eq!(lines[2], "     22       NA");
        assert_eq!(lines[3], "# ... with 1 more rows");
    }
}
