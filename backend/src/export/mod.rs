//! Filtered-data download.
//!
//! Written as UTF-8 with a BOM so that spreadsheet software on Japanese
//! Windows opens it without mojibake.

use std::io::Write;
use std::path::Path;

use crate::error::ExportError;
use crate::models::Observation;

/// File name offered to the browser.
pub const DOWNLOAD_FILE_NAME: &str = "filtered_cheese_data.csv";

/// MIME type of the download.
pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const COLUMNS: [&str; 4] = ["指標", "年", "値", "西暦"];

/// Serialize observations to BOM-prefixed CSV bytes.
pub fn to_csv_bytes(observations: &[Observation]) -> Result<Vec<u8>, ExportError> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(COLUMNS)?;
        for obs in observations {
            writer.write_record([
                obs.indicator.clone(),
                obs.era_label.clone(),
                obs.value.to_string(),
                obs.year.map(|y| y.to_string()).unwrap_or_default(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// Write the CSV to a file.
pub fn write_csv(observations: &[Observation], path: &Path) -> Result<(), ExportError> {
    let bytes = to_csv_bytes(observations)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}
