use crate::Result;
use core::fmt::Write;
use serde::Serialize;

pub fn generate<R: Serialize + ?Sized, W: Write>(report: &R, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}
