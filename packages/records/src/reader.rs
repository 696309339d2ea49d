//! Lazy, row-by-row reader over a delimited incident file.

use std::fs::File;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use crime_grid_models::{NarkotaRecord, SummaryRecord};

use crate::LoadError;
use crate::parsing::{collapse_whitespace, parse_cell, parse_count, parse_date};
use crate::progress::{ProgressCallback, null_progress};

/// A fixed, positional column layout.
///
/// Header names in the file are ignored; only the column count is checked.
/// Columns in a different order are not detected.
pub trait Schema: Sized {
    /// Human-readable schema name for logs and errors.
    const NAME: &'static str;

    /// Column names in file order. The first column is the row index.
    const COLUMNS: &'static [&'static str];

    /// Builds a record from one data row.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if any field fails to parse.
    fn from_row(row: &csv::StringRecord) -> Result<Self, LoadError>;
}

fn field(row: &csv::StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("")
}

impl Schema for SummaryRecord {
    const NAME: &'static str = "summary";
    const COLUMNS: &'static [&'static str] =
        &["index", "date", "group", "type", "victims", "dead", "cell"];

    fn from_row(row: &csv::StringRecord) -> Result<Self, LoadError> {
        Ok(Self {
            date: parse_date(field(row, 1))?,
            group: collapse_whitespace(field(row, 2)),
            kind: collapse_whitespace(field(row, 3)),
            victims: parse_count(field(row, 4))?,
            dead: parse_count(field(row, 5))?,
            cell: parse_cell(row.get(6))?,
        })
    }
}

impl Schema for NarkotaRecord {
    const NAME: &'static str = "narkota";
    const COLUMNS: &'static [&'static str] =
        &["index", "date", "sbit_try", "storage", "sbit", "other", "cell"];

    fn from_row(row: &csv::StringRecord) -> Result<Self, LoadError> {
        Ok(Self {
            date: parse_date(field(row, 1))?,
            attempted_sale: parse_count(field(row, 2))?,
            storage: parse_count(field(row, 3))?,
            sale: parse_count(field(row, 4))?,
            other: parse_count(field(row, 5))?,
            cell: parse_cell(row.get(6))?,
        })
    }
}

/// Forward-only iterator of parsed records.
///
/// Rows are read and parsed as the iterator advances. A row that fails to
/// parse yields an `Err` item; iteration may continue past it.
pub struct RecordReader<T, R> {
    rows: csv::StringRecordsIntoIter<R>,
    progress: Arc<dyn ProgressCallback>,
    count: u64,
    done: bool,
    schema: PhantomData<fn() -> T>,
}

impl<T: Schema> RecordReader<T, File> {
    /// Opens `path` and validates its header.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be opened, or any error
    /// from [`RecordReader::from_reader`].
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, LoadError> {
        log::info!("Loading {} records from {}", T::NAME, path.display());
        Self::from_reader(File::open(path)?, delimiter)
    }
}

impl<T: Schema, R: Read> RecordReader<T, R> {
    /// Wraps any byte source. The first row must be a header.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Csv`] if the header cannot be read and
    /// [`LoadError::Schema`] if it has the wrong number of columns.
    pub fn from_reader(reader: R, delimiter: u8) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let found = reader.headers()?.len();
        if found != T::COLUMNS.len() {
            return Err(LoadError::Schema {
                schema: T::NAME,
                expected: T::COLUMNS.len(),
                found,
            });
        }

        Ok(Self {
            rows: reader.into_records(),
            progress: null_progress(),
            count: 0,
            done: false,
            schema: PhantomData,
        })
    }

    /// Reports each consumed row to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        progress.set_message(format!("Reading {} records", T::NAME));
        self.progress = progress;
        self
    }

    /// Number of rows consumed so far.
    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.count
    }
}

impl<T: Schema, R: Read> Iterator for RecordReader<T, R> {
    type Item = Result<T, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.rows.next() {
            self.count += 1;
            self.progress.inc(1);
            return Some(row.map_err(LoadError::from).and_then(|row| T::from_row(&row)));
        }

        if !self.done {
            self.done = true;
            log::info!("Read {} {} rows", self.count, T::NAME);
            self.progress
                .finish(format!("{} -- {} rows", T::NAME, self.count));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use crime_grid_models::Point;

    use super::*;

    const SUMMARY: &str = "\
;date;group;type;victims;dead;cell
0;2017-01-05;Глава 21.  Преступления   против собственности;Кража;1;0;[[55.7, 37.6], [55.7, 37.7]]
1;2017-01-06;Глава 16. Преступления против жизни и здоровья;Убийство;1;1;
";

    #[test]
    fn reads_summary_rows() {
        let records: Vec<SummaryRecord> =
            RecordReader::<SummaryRecord, _>::from_reader(SUMMARY.as_bytes(), b';')
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].group, "Глава 21. Преступления против собственности");
        assert_eq!(records[0].kind, "Кража");
        assert_eq!(records[0].victims, Some(1));
        assert_eq!(records[0].dead, Some(0));
        assert_eq!(
            records[0].cell.as_ref().unwrap().corner(),
            Point::new(55.7, 37.6)
        );
        assert!(records[1].cell.is_none());
    }

    #[test]
    fn reads_narkota_rows() {
        let data = "\
;date;sbit_try;storage;sbit;other;cell
0;2016-05-01;1;2.0;;4;\"[[55.75, 37.61]]\"
";
        let records: Vec<NarkotaRecord> =
            RecordReader::<NarkotaRecord, _>::from_reader(data.as_bytes(), b';')
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.attempted_sale, Some(1));
        assert_eq!(record.storage, Some(2));
        assert_eq!(record.sale, None);
        assert_eq!(record.other, Some(4));
        assert_eq!(record.cell.as_ref().unwrap().corner(), Point::new(55.75, 37.61));
    }

    #[test]
    fn rejects_wrong_column_count() {
        let data = ";date;group;cell\n0;2017-01-05;x;\n";
        let err = RecordReader::<SummaryRecord, _>::from_reader(data.as_bytes(), b';')
            .err()
            .unwrap();

        assert!(matches!(
            err,
            LoadError::Schema {
                expected: 7,
                found: 4,
                ..
            }
        ));
    }

    #[test]
    fn bad_row_does_not_poison_stream() {
        let data = "\
;date;group;type;victims;dead;cell
0;not-a-date;g;t;;;
1;2017-01-06;g;t;;;
";
        let mut reader =
            RecordReader::<SummaryRecord, _>::from_reader(data.as_bytes(), b';').unwrap();

        assert!(matches!(reader.next(), Some(Err(LoadError::Date { .. }))));
        assert!(matches!(reader.next(), Some(Ok(_))));
        assert!(reader.next().is_none());
        assert_eq!(reader.rows_read(), 2);
    }

    #[test]
    fn short_row_is_csv_error() {
        let data = ";date;group;type;victims;dead;cell\n0;2017-01-06;g\n";
        let mut reader =
            RecordReader::<SummaryRecord, _>::from_reader(data.as_bytes(), b';').unwrap();

        assert!(matches!(reader.next(), Some(Err(LoadError::Csv(_)))));
    }

    struct CountingProgress {
        rows: AtomicU64,
        finished: AtomicU64,
    }

    impl ProgressCallback for CountingProgress {
        fn inc(&self, delta: u64) {
            self.rows.fetch_add(delta, Ordering::SeqCst);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn reports_progress_once_exhausted() {
        let progress = Arc::new(CountingProgress {
            rows: AtomicU64::new(0),
            finished: AtomicU64::new(0),
        });

        let mut reader = RecordReader::<SummaryRecord, _>::from_reader(SUMMARY.as_bytes(), b';')
            .unwrap()
            .with_progress(progress.clone());

        assert_eq!(reader.by_ref().count(), 2);
        assert!(reader.next().is_none());

        assert_eq!(progress.rows.load(Ordering::SeqCst), 2);
        assert_eq!(progress.finished.load(Ordering::SeqCst), 1);
    }
}
