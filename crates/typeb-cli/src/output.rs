use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render a two-space-separated table. Numeric columns are right-aligned
/// and the last cell of each row is printed unpadded so lines never carry
/// trailing whitespace.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    let mut numeric = vec![!rows.is_empty(); cols];
    for row in &rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.len());
            if !cell.chars().all(|c| c.is_ascii_digit()) {
                numeric[i] = false;
            }
        }
    }

    print_row(headers.iter().map(|h| h.to_string()), &widths, &numeric);
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));
    for row in rows {
        print_row(row.into_iter().take(cols), &widths, &numeric);
    }
}

fn print_row(cells: impl Iterator<Item = String>, widths: &[usize], numeric: &[bool]) {
    let cells: Vec<String> = cells
        .enumerate()
        .map(|(i, cell)| {
            if numeric[i] {
                format!("{:>width$}", cell, width = widths[i])
            } else {
                format!("{:width$}", cell, width = widths[i])
            }
        })
        .collect();
    println!("{}", cells.join("  ").trim_end());
}
