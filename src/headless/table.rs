//! Plain-text rendering of the device table

use dscreen_app::{Column, DeviceRegistry};
use dscreen_core::DeviceKind;

/// Render the registry as an aligned text table with localized headers.
///
/// Every line ends with a newline. An empty registry renders the header
/// followed by a `(no devices)` line; otherwise a legend for the type
/// codes closes the table.
pub fn render_table(registry: &DeviceRegistry) -> String {
    let headers = registry.column_names();
    let rows: Vec<Vec<String>> = registry
        .records()
        .iter()
        .map(|record| {
            Column::ALL
                .iter()
                .map(|column| column.value(record).to_string())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    if rows.is_empty() {
        out.push_str("(no devices)\n");
    }
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    if !rows.is_empty() {
        let legend = [DeviceKind::Emulator, DeviceKind::Device]
            .iter()
            .map(|kind| format!("{} = {}", kind.code(), registry.label(kind.label_key())))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&legend);
        out.push('\n');
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
