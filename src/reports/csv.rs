use super::Tabular;
use crate::Result;
use core::fmt::Write;
use ohno::IntoAppError;

pub fn generate<R: Tabular, W: Write>(rows: &[R], writer: &mut W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        csv_writer.write_record(R::COLUMNS)?;
    }

    for row in rows {
        csv_writer.serialize(row)?;
    }

    let bytes = csv_writer.into_inner().map_err(|e| e.into_error()).into_app_err("flushing CSV output")?;
    let text = String::from_utf8(bytes).into_app_err("CSV output is not valid UTF-8")?;
    write!(writer, "{text}")?;
    Ok(())
}
