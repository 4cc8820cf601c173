//! Column-major view of a CSV export.
//!
//! Cells are kept as text until a column is asked for as numbers, so columns
//! that are never plotted (time columns, unrelated sensors) are never parsed.

use crate::core::io::{InputKind, MmapSource, detect_input_kind, open_gzip_reader};
use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Tokens treated as a missing value, matching the usual dataframe defaults.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
}

impl Cell {
    fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if MISSING_TOKENS.contains(&s) {
            Cell::Missing
        } else {
            Cell::Text(s.to_string())
        }
    }
}

#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Vec<Cell>>,
    rows: usize,
}

impl Table {
    pub fn load(path: &Path) -> Result<Self> {
        let kind = detect_input_kind(path)?;
        let table = match kind {
            InputKind::Plain => {
                let src = MmapSource::open(path)?;
                Self::from_reader(src.bytes())
            }
            InputKind::Gzip => Self::from_reader(open_gzip_reader(path)?),
        };
        table.with_context(|| format!("failed to read CSV {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers = dedupe_headers(rdr.headers().context("failed to read header row")?.iter());
        if headers.is_empty() {
            bail!("no columns found in input");
        }

        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
        let mut rows = 0usize;
        for record in rdr.records() {
            let record = record.with_context(|| format!("failed to read row {}", rows + 1))?;
            rows += 1;
            if record.len() > headers.len() {
                bail!(
                    "row {} has {} fields, expected at most {}",
                    rows,
                    record.len(),
                    headers.len()
                );
            }
            for (i, col) in columns.iter_mut().enumerate() {
                col.push(record.get(i).map(Cell::parse).unwrap_or(Cell::Missing));
            }
        }

        Ok(Self {
            headers,
            columns,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column(&self, idx: usize) -> &[Cell] {
        &self.columns[idx]
    }

    /// Numeric values of a column with missing entries dropped.
    ///
    /// Text that is not a finite number is an error naming the column and row.
    pub fn numeric(&self, idx: usize) -> Result<Vec<f64>> {
        let name = &self.headers[idx];
        let mut out = Vec::with_capacity(self.rows);
        for (row, cell) in self.columns[idx].iter().enumerate() {
            let Cell::Text(s) = cell else {
                continue;
            };
            let v: f64 = s
                .parse()
                .with_context(|| format!("column '{}' row {}: not a number: {:?}", name, row + 1, s))?;
            if v.is_nan() {
                continue;
            }
            if !v.is_finite() {
                bail!("column '{}' row {}: non-finite value {:?}", name, row + 1, s);
            }
            out.push(v);
        }
        Ok(out)
    }
}

/// Repeated header names become `name.1`, `name.2`, ... in order of appearance.
fn dedupe_headers<'a, I: Iterator<Item = &'a str>>(raw: I) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();
    for name in raw {
        let mut col = name.to_string();
        let mut cur = seen.get(&col).copied().unwrap_or(0);
        while cur > 0 {
            seen.insert(col.clone(), cur + 1);
            col = format!("{}.{}", col, cur);
            cur = seen.get(&col).copied().unwrap_or(0);
        }
        seen.insert(col.clone(), cur + 1);
        out.push(col);
    }
    out
}
