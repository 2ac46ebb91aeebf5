use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};
use std::io::Write;
use std::path::Path;

use crate::pipeline::Collected;

/// Write the header and rows as delimited text
pub fn write_csv_to<W: Write>(writer: W, collected: &Collected) -> Result<()> {
    let mut csv = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(&collected.header)
        .context("Failed to write CSV header")?;

    for row in &collected.rows {
        csv.write_record(row.cells.iter().map(|cell| cell.plain()))
            .with_context(|| format!("Failed to write CSV row for killmail {}", row.killmail_id))?;
    }

    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn write_csv(path: &Path, collected: &Collected) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    write_csv_to(file, collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CellValue, Row};

    #[test]
    fn test_csv_layout() {
        let collected = Collected {
            header: vec!["Killmail ID".to_string(), "Ship".to_string(), "Corporation".to_string()],
            rows: vec![Row {
                killmail_id: 1001,
                cells: vec![
                    CellValue::Integer(1001),
                    CellValue::Text("Rifter, Republic Fleet".to_string()),
                    CellValue::Empty,
                ],
                focused: false,
            }],
            focus: None,
            pages_done: 1,
            cancelled: false,
        };

        let mut out = Vec::new();
        write_csv_to(&mut out, &collected).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Killmail ID,Ship,Corporation\n1001,\"Rifter, Republic Fleet\",\n"
        );
    }
}
