use std::io::{self, Write};

use serde::Serialize;

use crate::app::SyncReport;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &SyncReport) -> io::Result<()> {
        Self::print_json(&mut io::stdout().lock(), report)
    }

    pub fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        out.write_all(json.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }
}
