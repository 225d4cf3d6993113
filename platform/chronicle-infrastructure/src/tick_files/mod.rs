//! CSV tick archives on the local filesystem.
//!
//! A tick directory holds one `<SYMBOL>.csv` file per instrument with the
//! header `date,time,millis,trade,size,is_index`. `millis` and `is_index`
//! may be omitted. Rows must already be in time order.

use chronicle_domain::repositories::tick_source::{
    SourceCollection, SourceError, SourceFilter, TickSource,
};
use chronicle_domain::value_objects::tick::Tick;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const TICK_FILE_EXTENSION: &str = "csv";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TickRecord {
    pub date: i32,
    pub time: i32,
    #[serde(default)]
    pub millis: u16,
    pub trade: String,
    pub size: i64,
    #[serde(default)]
    pub is_index: bool,
}

impl TickRecord {
    fn from_tick(tick: &Tick) -> Self {
        Self {
            date: tick.date,
            time: tick.time,
            millis: tick.millis,
            trade: tick.trade.to_string(),
            size: tick.size,
            is_index: tick.is_index,
        }
    }

    fn into_tick(self, symbol: &str) -> Result<Tick, SourceError> {
        let trade = Decimal::from_str(self.trade.trim()).map_err(|err| {
            SourceError::InvalidData {
                symbol: symbol.to_string(),
                reason: format!(
                    "bad trade price {:?} at {}.{}: {err}",
                    self.trade, self.date, self.time
                ),
            }
        })?;
        Ok(Tick {
            symbol: symbol.to_string(),
            trade,
            size: self.size,
            date: self.date,
            time: self.time,
            millis: self.millis,
            is_index: self.is_index,
            valid: true,
        })
    }
}

/// Streams one instrument's ticks from a CSV file.
pub struct CsvTickSource {
    symbol: String,
    path: PathBuf,
    byte_len: u64,
    records: csv::DeserializeRecordsIntoIter<File, TickRecord>,
    rows: u64,
    exhausted: bool,
}

impl CsvTickSource {
    /// Opens `path`, naming the instrument after the file stem.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let symbol = symbol_for(path).ok_or_else(|| SourceError::Open {
            name: path.display().to_string(),
            reason: "file name is not a valid symbol".to_string(),
        })?;
        Self::open_with_symbol(path, symbol)
    }

    pub fn open_with_symbol(path: &Path, symbol: impl Into<String>) -> Result<Self, SourceError> {
        let open_error = |err: std::io::Error| SourceError::Open {
            name: path.display().to_string(),
            reason: err.to_string(),
        };
        let file = File::open(path).map_err(open_error)?;
        let byte_len = file.metadata().map_err(open_error)?.len();
        Ok(Self {
            symbol: symbol.into(),
            path: path.to_path_buf(),
            byte_len,
            records: csv::Reader::from_reader(file).into_deserialize::<TickRecord>(),
            rows: 0,
            exhausted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_read(&self) -> u64 {
        self.rows
    }
}

impl TickSource for CsvTickSource {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn next_tick(&mut self) -> Result<Tick, SourceError> {
        match self.records.next() {
            Some(Ok(record)) => {
                self.rows += 1;
                record.into_tick(&self.symbol)
            }
            Some(Err(err)) => Err(SourceError::Read {
                symbol: self.symbol.clone(),
                reason: format!("row {} of {}: {err}", self.rows + 1, self.path.display()),
            }),
            None => {
                if !self.exhausted {
                    self.exhausted = true;
                    metrics::counter!("chronicle.infra.tick_files.rows_total")
                        .increment(self.rows);
                    debug!(symbol = %self.symbol, rows = self.rows, "tick file drained");
                }
                Ok(Tick::invalid())
            }
        }
    }

    fn byte_len(&self) -> u64 {
        self.byte_len
    }
}

/// A directory of per-symbol tick files.
#[derive(Debug, Clone)]
pub struct TickDirectory {
    root: PathBuf,
}

impl TickDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tick files under the root, sorted by file name.
    pub fn list_files(&self) -> Result<Vec<PathBuf>, SourceError> {
        let entries = fs::read_dir(&self.root).map_err(|err| SourceError::Open {
            name: self.root.display().to_string(),
            reason: err.to_string(),
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| SourceError::Open {
                    name: self.root.display().to_string(),
                    reason: err.to_string(),
                })?
                .path();
            let is_tick_file = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(TICK_FILE_EXTENSION));
            if path.is_file() && is_tick_file {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl SourceCollection for TickDirectory {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn open(&self, filter: &SourceFilter) -> Result<Vec<Box<dyn TickSource>>, SourceError> {
        let mut sources: Vec<Box<dyn TickSource>> = Vec::new();
        for path in self.list_files()? {
            let Some(symbol) = symbol_for(&path) else {
                continue;
            };
            if !filter.admits(&symbol) {
                continue;
            }
            let source = CsvTickSource::open_with_symbol(&path, symbol)?;
            debug!(symbol = %source.symbol(), bytes = source.byte_len(), "opened tick file");
            sources.push(Box::new(source));
        }
        metrics::counter!("chronicle.infra.tick_files.opened_total")
            .increment(sources.len() as u64);
        info!(root = %self.root.display(), files = sources.len(), "tick directory opened");
        Ok(sources)
    }
}

fn symbol_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// Writes ticks in the layout `CsvTickSource` reads back.
pub fn write_ticks_csv(path: &Path, ticks: &[Tick]) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create tick file {}: {}", path.display(), err))?;
    for tick in ticks.iter().filter(|tick| tick.is_valid()) {
        writer
            .serialize(TickRecord::from_tick(tick))
            .map_err(|err| format!("failed to write tick row: {}", err))?;
    }
    writer
        .flush()
        .map_err(|err| format!("failed to flush tick file {}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "chronicle_tick_files_{label}_{}_{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn drain(source: &mut dyn TickSource) -> Vec<Tick> {
        let mut ticks = Vec::new();
        loop {
            let tick = source.next_tick().expect("read tick");
            if !tick.is_valid() {
                return ticks;
            }
            ticks.push(tick);
        }
    }

    #[test]
    fn reads_rows_with_optional_columns() {
        let dir = temp_dir("optional");
        let path = dir.join("IBM.csv");
        fs::write(
            &path,
            "date,time,trade,size\n20240105,93000,101.25,200\n20240105,93001,0,0\n",
        )
        .expect("write csv");

        let mut source = CsvTickSource::open(&path).expect("open");
        assert_eq!(source.symbol(), "IBM");
        assert!(source.byte_len() > 0);
        let ticks = drain(&mut source);
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].trade, dec!(101.25));
        assert_eq!(ticks[0].millis, 0);
        assert!(!ticks[0].is_index);
        assert!(!ticks[1].is_trade());
        assert_eq!(source.rows_read(), 2);

        // exhausted sources keep answering with the sentinel
        assert!(!source.next_tick().expect("sentinel").is_valid());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn bad_price_is_invalid_data() {
        let dir = temp_dir("bad_price");
        let path = dir.join("MSFT.csv");
        fs::write(&path, "date,time,trade,size\n20240105,93000,abc,1\n").expect("write csv");

        let mut source = CsvTickSource::open(&path).expect("open");
        let err = source.next_tick().expect_err("bad price");
        assert!(matches!(err, SourceError::InvalidData { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn short_row_is_a_read_error() {
        let dir = temp_dir("short_row");
        let path = dir.join("MSFT.csv");
        fs::write(&path, "date,time,trade,size\n20240105,93000\n").expect("write csv");

        let mut source = CsvTickSource::open(&path).expect("open");
        let err = source.next_tick().expect_err("short row");
        assert!(matches!(err, SourceError::Read { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn directory_opens_sorted_filtered_csv_files() {
        let dir = temp_dir("directory");
        let tick = Tick::new_trade("X", 20240105, 93000, dec!(10), 1);
        write_ticks_csv(&dir.join("MSFT.csv"), &[tick.clone()]).expect("write msft");
        write_ticks_csv(&dir.join("AAPL.csv"), &[tick.clone()]).expect("write aapl");
        write_ticks_csv(&dir.join("IBM.csv"), &[tick]).expect("write ibm");
        fs::write(dir.join("notes.txt"), "ignored").expect("write notes");

        let directory = TickDirectory::new(&dir);
        let all = directory.open(&SourceFilter::all()).expect("open all");
        let symbols: Vec<&str> = all.iter().map(|source| source.symbol()).collect();
        assert_eq!(symbols, vec!["AAPL", "IBM", "MSFT"]);

        let some = directory
            .open(&SourceFilter::symbols(["ibm"]))
            .expect("open filtered");
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].symbol(), "IBM");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_directory_fails_to_open() {
        let directory =
            TickDirectory::new(std::env::temp_dir().join("chronicle_no_such_tick_dir"));
        let err = directory.open(&SourceFilter::all()).err().expect("missing dir");
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn written_ticks_read_back_with_symbol_from_file() {
        let dir = temp_dir("write_read");
        let path = dir.join("SPX.csv");
        let mut index = Tick::new_index("ignored", 20240105, 93000, dec!(4700.5));
        index.millis = 250;
        write_ticks_csv(&path, &[index, Tick::invalid()]).expect("write");

        let mut source = CsvTickSource::open(&path).expect("open");
        let ticks = drain(&mut source);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].symbol, "SPX");
        assert!(ticks[0].is_index);
        assert_eq!(ticks[0].millis, 250);
        assert_eq!(ticks[0].trade, dec!(4700.5));
        fs::remove_dir_all(&dir).ok();
    }
}
