//! e-Stat CSV loader with encoding detection and header-row discovery.
//!
//! e-Stat exports start with a block of free-form metadata lines (table
//! title, survey name, notes) before the real header. The header is the
//! first line containing a marker string, `各種チーズ` for the cheese table.

use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Marker identifying the header row and the indicator label column.
pub const DEFAULT_MARKER: &str = "各種チーズ";

const UTF8_BOM: char = '\u{feff}';

/// Positional table below the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column headers, duplicates kept.
    pub headers: Vec<String>,
    /// Data rows, each exactly `headers.len()` cells wide.
    pub rows: Vec<Vec<String>>,
    /// Zero-based line index of the header row in the decoded file.
    pub header_line: usize,
    /// Encoding used to decode the file.
    pub encoding: String,
}

impl RawTable {
    /// Cell at (row, column), empty when out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Detect the encoding of raw bytes.
///
/// A BOM or valid UTF-8 wins outright; otherwise chardet decides, with
/// Japanese charsets normalized to the names [`decode_content`] knows.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) || std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "shift_jis" | "shift-jis" | "sjis" | "cp932" | "windows-31j" => "shift_jis".to_string(),
        "euc-jp" | "euc_jp" => "euc-jp".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        // Undetectable short files from e-Stat are almost always Shift_JIS.
        "" => "shift_jis".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the specified encoding. A leading BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "shift_jis" | "sjis" | "cp932" => decode_with(encoding_rs::SHIFT_JIS, bytes, encoding)?,
        "euc-jp" => decode_with(encoding_rs::EUC_JP, bytes, encoding)?,
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(decoded.strip_prefix(UTF8_BOM).map(String::from).unwrap_or(decoded))
}

fn decode_with(
    codec: &'static encoding_rs::Encoding,
    bytes: &[u8],
    name: &str,
) -> CsvResult<String> {
    let (text, _, had_errors) = codec.decode(bytes);
    if had_errors && text.chars().all(|c| c == char::REPLACEMENT_CHARACTER || c.is_whitespace()) {
        return Err(CsvError::EncodingError {
            encoding: name.to_string(),
            message: "no decodable characters".to_string(),
        });
    }
    Ok(text.into_owned())
}

/// Index of the first line containing `marker`.
pub fn find_header_row(content: &str, marker: &str) -> CsvResult<usize> {
    content
        .lines()
        .position(|line| line.contains(marker))
        .ok_or_else(|| CsvError::HeaderNotFound(marker.to_string()))
}

/// Parse decoded content: skip the metadata block, then read the header row
/// and everything below it as comma-separated records.
pub fn parse_table(content: &str, marker: &str, encoding: &str) -> CsvResult<RawTable> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let header_line = find_header_row(content, marker)?;
    let offset: usize = content
        .split_inclusive('\n')
        .take(header_line)
        .map(str::len)
        .sum();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content[offset..].as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| parse_error(header_line, e))?
            .iter()
            .map(|s| s.trim().to_string())
            .collect(),
        None => return Err(CsvError::HeaderNotFound(marker.to_string())),
    };

    let width = headers.len();
    let mut rows = Vec::new();

    for (idx, record) in records.enumerate() {
        let record = record.map_err(|e| parse_error(header_line + idx + 1, e))?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable {
        headers,
        rows,
        header_line,
        encoding: encoding.to_string(),
    })
}

fn parse_error(line: usize, err: csv::Error) -> CsvError {
    let line = err
        .position()
        .map(|p| line + p.line() as usize)
        .unwrap_or(line);
    CsvError::ParseError {
        line,
        message: err.to_string(),
    }
}

/// Parse bytes with encoding auto-detection.
pub fn parse_bytes(bytes: &[u8], marker: &str) -> CsvResult<RawTable> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    parse_table(&content, marker, &encoding)
}

/// Read and parse a file with encoding auto-detection.
pub fn parse_file<P: AsRef<Path>>(path: P, marker: &str) -> CsvResult<RawTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
\"統計名：\",\"牛乳乳製品統計調査\"
\"表題：\",\"チーズの需給表\"

\"cat01_code\",\"各種チーズ\",\"単位\",\"平成30年\",\"令和元年\"
\"100\",\"生産量\",\"t\",\"45,000\",\"46,500\"
\"200\",\"輸入量\",\"t\",\"280,000\",\"-\"
";

    #[test]
    fn test_find_header_row() {
        assert_eq!(find_header_row(SAMPLE, DEFAULT_MARKER).unwrap(), 3);
    }

    #[test]
    fn test_header_not_found() {
        let err = find_header_row("a,b\n1,2\n", DEFAULT_MARKER).unwrap_err();
        assert!(matches!(err, CsvError::HeaderNotFound(_)));
    }

    #[test]
    fn test_parse_skips_metadata_block() {
        let table = parse_table(SAMPLE, DEFAULT_MARKER, "utf-8").unwrap();

        assert_eq!(table.header_line, 3);
        assert_eq!(table.headers, vec!["cat01_code", "各種チーズ", "単位", "平成30年", "令和元年"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 3), "45,000");
        assert_eq!(table.cell(1, 4), "-");
    }

    #[test]
    fn test_ragged_rows_are_normalized() {
        let csv = "各種チーズ,平成30年,令和元年\nA,1\nB,2,3,4\n,,\n";
        let table = parse_table(csv, DEFAULT_MARKER, "utf-8").unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["A", "1", ""]);
        assert_eq!(table.rows[1], vec!["B", "2", "3"]);
    }

    #[test]
    fn test_header_only() {
        let table = parse_table("各種チーズ,令和2年\n", DEFAULT_MARKER, "utf-8").unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_bytes(b"", DEFAULT_MARKER), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_table("  \n", DEFAULT_MARKER, "utf-8"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("各種チーズ,令和2年\nA,1\n".as_bytes());

        assert_eq!(detect_encoding(&bytes), "utf-8");
        let table = parse_bytes(&bytes, DEFAULT_MARKER).unwrap();
        assert_eq!(table.header_line, 0);
        assert_eq!(table.headers[0], "各種チーズ");
    }

    #[test]
    fn test_shift_jis_decoding() {
        let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(SAMPLE);
        let decoded = decode_content(&encoded, "shift_jis").unwrap();
        assert!(decoded.contains("各種チーズ"));

        let table = parse_table(&decoded, DEFAULT_MARKER, "shift_jis").unwrap();
        assert_eq!(table.cell(1, 1), "輸入量");
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = parse_file(file.path(), DEFAULT_MARKER).unwrap();
        assert_eq!(table.encoding, "utf-8");
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_file("/nonexistent/estat.csv", DEFAULT_MARKER).unwrap_err();
        assert!(matches!(err, CsvError::IoError(_)));
    }
}
