//! CSV summary: one row per genre

use super::summarize;
use crate::dashboard::Dashboard;
use crate::error::Result;
use std::io::Write;

pub fn write<W: Write>(writer: &mut W, dashboard: &Dashboard) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for row in summarize(dashboard) {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::record::tests::sample_store;

    #[test]
    fn test_csv_rows() {
        let dash = Dashboard::new(sample_store(), ViewConfig::default());
        let mut out = Vec::new();
        write(&mut out, &dash).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "genre,count,percent,improve,no_effect,worsen,active");
        assert_eq!(lines[1], "Jazz,2,40.0,2,0,0,true");
        assert_eq!(lines.len(), 4);
    }
}
