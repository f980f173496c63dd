//! Batch input parsing and result export.
//!
//! Input is either a CSV table with `from_pincode` and `to_pincode`
//! columns, or free text with one `from,to` pair per line.

use std::io::{Read, Write};
use thiserror::Error;

use crate::pair::{PairInput, PairRecord, PairResult};

pub const FROM_COLUMN: &str = "from_pincode";
pub const TO_COLUMN: &str = "to_pincode";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Input is missing the '{0}' column")]
    MissingColumn(&'static str),
}

/// Read pairs from a CSV table with a header row.
///
/// Column order is free and extra columns are ignored. Short rows yield empty codes.
pub fn read_pairs_csv<R: Read>(reader: R) -> Result<Vec<PairInput>, BatchError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
            .ok_or(BatchError::MissingColumn(name))
    };
    let from_idx = find(FROM_COLUMN)?;
    let to_idx = find(TO_COLUMN)?;

    let mut pairs = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let from = row.get(from_idx).unwrap_or("");
        let to = row.get(to_idx).unwrap_or("");
        if from.is_empty() && to.is_empty() {
            continue;
        }
        pairs.push(PairInput::new(from, to));
    }
    Ok(pairs)
}

/// Parse "from,to" lines. Lines without a comma are skipped.
pub fn parse_manual_pairs(text: &str) -> Vec<PairInput> {
    text.lines()
        .filter_map(|line| {
            let (from, rest) = line.split_once(',')?;
            // Anything after a second comma is ignored.
            let to = rest.split(',').next().unwrap_or("");
            Some(PairInput::new(from.trim(), to.trim()))
        })
        .collect()
}

/// Write results as CSV with the eight output columns.
pub fn write_records_csv<W: Write>(writer: W, results: &[PairResult]) -> Result<(), BatchError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(PairRecord::COLUMNS)?;
    for r in results {
        let rec = r.record();
        wtr.write_record([
            rec.from.as_str(),
            rec.to.as_str(),
            rec.from_city.as_str(),
            rec.from_state.as_str(),
            rec.to_city.as_str(),
            rec.to_state.as_str(),
            rec.distance_km.to_string().as_str(),
            rec.zone.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn records_json(results: &[PairResult]) -> Result<String, BatchError> {
    let records: Vec<PairRecord> = results.iter().map(PairResult::record).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::tests::stub_processor;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_csv_any_column_order() {
        let data = "order_id,to_pincode,from_pincode\nA1, 400001 ,110001\nA2,431001,413001\n";
        let pairs = read_pairs_csv(data.as_bytes()).unwrap();
        assert_eq!(
            pairs,
            vec![PairInput::new("110001", "400001"), PairInput::new("413001", "431001")]
        );
    }

    #[test]
    fn test_read_csv_missing_column() {
        let data = "from_pincode,destination\n110001,400001\n";
        assert!(matches!(
            read_pairs_csv(data.as_bytes()),
            Err(BatchError::MissingColumn("to_pincode"))
        ));
    }

    #[test]
    fn test_read_csv_skips_blank_rows() {
        let data = "from_pincode,to_pincode\n110001,400001\n,\n";
        assert_eq!(read_pairs_csv(data.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_read_csv_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pairs.csv");
        fs::write(&path, "\u{feff}from_pincode,to_pincode\n110001,110001\n").unwrap();
        let pairs = read_pairs_csv(fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(pairs, vec![PairInput::new("110001", "110001")]);
    }

    #[test]
    fn test_parse_manual_pairs() {
        let pairs = parse_manual_pairs("110001, 400001\nno comma here\n 413001,431001 ,extra\n");
        assert_eq!(
            pairs,
            vec![PairInput::new("110001", "400001"), PairInput::new("413001", "431001")]
        );
    }

    #[test]
    fn test_write_csv() {
        let p = stub_processor();
        let results = vec![p.process_pair("110001", "400001"), p.process_pair("110001", "302001")];
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &results).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "From,To,From City,From State,To City,To State,Distance (KM),Zone");
        assert!(lines[1].starts_with("110001,400001,Connaught Place,Delhi,Fort,Maharashtra,"));
        assert!(lines[1].ends_with(",METRO"));
        assert!(lines[2].ends_with(",N/A,ROI"));
    }

    #[test]
    fn test_csv_distance_matches_json() {
        let p = stub_processor();
        let results = vec![p.process_pair("110001", "110001")];
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &results).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out.lines().nth(1),
            Some("110001,110001,Connaught Place,Delhi,Connaught Place,Delhi,0.0,LOCAL")
        );
    }

    #[test]
    fn test_records_json() {
        let p = stub_processor();
        let json = records_json(&[p.process_pair("110001", "110001")]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v[0]["Zone"], "LOCAL");
        assert_eq!(v[0]["Distance (KM)"], 0.0);
    }
}
