use crate::chart::ChartSpec;
use crate::error::{PipelineError, Result};
use crate::models::{AggregatedRow, AggregatedTable, COUNTRY_COLUMN, FUNDED_COLUMN, Row};
use calamine::{Data, Reader, Xlsx, open_workbook};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// File name offered for the counts download.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "filtered_counts.csv";

/// Load a dataset, picking the parser by file extension (`.csv`, `.json` or `.xlsx`).
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let rows = match ext.as_str() {
        "csv" => read_rows_csv(File::open(path)?)?,
        "json" => read_rows_json(File::open(path)?)?,
        "xlsx" => read_rows_xlsx(path)?,
        other => return Err(PipelineError::UnsupportedFormat(format!(".{other}"))),
    };
    info!("loaded {} rows from {}", rows.len(), path.display());
    let blank = blank_country_rows(&rows);
    if blank > 0 {
        warn!("{blank} row(s) have an empty `{COUNTRY_COLUMN}` cell and are counted under \"\"");
    }
    Ok(rows)
}

fn blank_country_rows(rows: &[Row]) -> usize {
    rows.iter().filter(|r| r.country.is_empty()).count()
}

fn column_index<'a>(headers: impl IntoIterator<Item = &'a str>, name: &str) -> Result<usize> {
    headers
        .into_iter()
        .position(|h| h == name)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: name.to_string(),
        })
}

/// Read rows from CSV with a header row. `Country` and `Funded` are required;
/// every other column is kept as a passthrough field.
pub fn read_rows_csv<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let ci = column_index(headers.iter(), COUNTRY_COLUMN)?;
    let fi = column_index(headers.iter(), FUNDED_COLUMN)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let cell = |i: usize| record.get(i).unwrap_or("").to_string();
        let extra: BTreeMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ci && *i != fi)
            .map(|(i, h)| (h.to_string(), cell(i)))
            .collect();
        rows.push(Row {
            country: cell(ci),
            funded: cell(fi),
            extra,
        });
    }
    Ok(rows)
}

fn json_cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read rows from a JSON array of objects (records orientation).
pub fn read_rows_json<R: Read>(reader: R) -> Result<Vec<Row>> {
    let root: Value = serde_json::from_reader(reader)?;
    let records = root
        .as_array()
        .ok_or_else(|| PipelineError::Malformed("expected a top-level JSON array".into()))?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| PipelineError::Malformed(format!("row {i} is not a JSON object")))?;
        let required = |name: &str| {
            obj.get(name)
                .map(json_cell)
                .ok_or_else(|| PipelineError::MissingColumn {
                    column: name.to_string(),
                })
        };
        let country = required(COUNTRY_COLUMN)?;
        let funded = required(FUNDED_COLUMN)?;
        let extra = obj
            .iter()
            .filter(|(k, _)| k.as_str() != COUNTRY_COLUMN && k.as_str() != FUNDED_COLUMN)
            .map(|(k, v)| (k.clone(), json_cell(v)))
            .collect();
        rows.push(Row {
            country,
            funded,
            extra,
        });
    }
    Ok(rows)
}

fn xlsx_cell(d: &Data) -> String {
    match d {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::Error(e) => format!("{e:?}"),
    }
}

/// Read rows from the first worksheet of an `.xlsx` workbook. Row 0 holds the headers;
/// column rules match [`read_rows_csv`].
pub fn read_rows_xlsx<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let mut workbook: Xlsx<_> = open_workbook(path.as_ref())?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(PipelineError::Malformed("workbook contains no sheets".into()));
    };
    let range = workbook.worksheet_range(&sheet)?;

    let mut cells = range.rows();
    let headers: Vec<String> = cells
        .next()
        .map(|r| r.iter().map(xlsx_cell).collect())
        .unwrap_or_default();
    let ci = column_index(headers.iter().map(String::as_str), COUNTRY_COLUMN)?;
    let fi = column_index(headers.iter().map(String::as_str), FUNDED_COLUMN)?;

    let mut rows = Vec::new();
    for record in cells {
        let cell = |i: usize| record.get(i).map(xlsx_cell).unwrap_or_default();
        let extra: BTreeMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ci && *i != fi)
            .map(|(i, h)| (h.clone(), cell(i)))
            .collect();
        rows.push(Row {
            country: cell(ci),
            funded: cell(fi),
            extra,
        });
    }
    Ok(rows)
}

/// Serialize a table as CSV: header row of the table's column names, then one line per
/// row, `\n` terminated. Identical tables give identical bytes.
pub fn export_csv(table: &AggregatedTable) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(table.columns())?;
    for r in &table.rows {
        let count = r.count.to_string();
        match r.funded.as_deref() {
            Some(f) if table.is_split() => {
                wtr.write_record([r.country.as_str(), f, count.as_str()])?
            }
            _ => wtr.write_record([r.country.as_str(), count.as_str()])?,
        }
    }
    wtr.into_inner().map_err(|e| {
        let err = e.error();
        PipelineError::Io(std::io::Error::new(err.kind(), err.to_string()))
    })
}

/// Write the CSV export of `table` to `path`.
pub fn save_csv<P: AsRef<Path>>(table: &AggregatedTable, path: P) -> Result<()> {
    let bytes = export_csv(table)?;
    let mut f = File::create(path.as_ref())?;
    f.write_all(&bytes)?;
    info!(
        "exported {} rows to {}",
        table.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Parse bytes produced by [`export_csv`] back into a table.
///
/// Two columns read as `(country, count)`; three as `(country, funded, count)`.
pub fn parse_table_csv(bytes: &[u8]) -> Result<AggregatedTable> {
    let mut rdr = ReaderBuilder::new().from_reader(bytes);
    let headers = rdr.headers()?.clone();
    let split = match headers.len() {
        2 => false,
        3 => true,
        n => {
            return Err(PipelineError::Malformed(format!(
                "expected 2 or 3 columns, found {n}"
            )));
        }
    };

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let count_cell = record.get(headers.len() - 1).unwrap_or("");
        let count = count_cell.parse::<usize>().map_err(|_| {
            PipelineError::Malformed(format!("count `{count_cell}` is not a whole number"))
        })?;
        rows.push(AggregatedRow {
            country: record.get(0).unwrap_or("").to_string(),
            funded: split.then(|| record.get(1).unwrap_or("").to_string()),
            count,
        });
    }

    Ok(AggregatedTable {
        country_column: headers.get(0).unwrap_or(COUNTRY_COLUMN).to_string(),
        funded_column: split.then(|| headers.get(1).unwrap_or(FUNDED_COLUMN).to_string()),
        value_column: headers.get(headers.len() - 1).unwrap_or("").to_string(),
        rows,
    })
}

/// Save a chart spec as pretty JSON for an external renderer.
pub fn save_spec_json<P: AsRef<Path>>(spec: &ChartSpec, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(spec)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
