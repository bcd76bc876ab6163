//! Output table adapters.

mod console;
mod tsv_file;

pub use console::ConsoleTableSink;
pub use tsv_file::TsvFileSink;

/// Renders one tab-separated line. Tabs and line breaks inside a cell
/// become spaces so every record stays on one line.
pub(crate) fn tsv_line(cells: &[String]) -> String {
    let mut line = cells
        .iter()
        .map(|cell| cell.replace(['\t', '\r', '\n'], " "))
        .collect::<Vec<_>>()
        .join("\t");
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsv_line_flattens_cells() {
        let cells = vec!["Acme\tInc".to_string(), "line\nbreak".to_string(), String::new()];
        assert_eq!(tsv_line(&cells), "Acme Inc\tline break\t\n");
    }
}
