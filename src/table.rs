use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// A row type with a fixed, tab-separated column layout.
/// Field order in the struct must match `COLUMNS`.
pub trait Table: Serialize + DeserializeOwned {
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Refuse to touch an existing file.
    CreateNew,
    /// Create with a header if absent or empty, otherwise add rows after the existing ones.
    Append,
}

/// Single writer for one output table.
pub struct TableWriter<R> {
    inner: csv::Writer<File>,
    rows: usize,
    _row: PhantomData<fn(&R)>,
}

impl<R: Table> TableWriter<R> {
    pub fn open(path: impl AsRef<Path>, mode: WriteMode) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = match mode {
            WriteMode::CreateNew => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => Error::OverwriteConflict {
                        path: path.to_path_buf(),
                    },
                    _ => Error::Io(e),
                })?,
            WriteMode::Append => OpenOptions::new().append(true).create(true).open(path)?,
        };
        let is_empty = file.metadata()?.len() == 0;

        let mut inner = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(file);
        if is_empty {
            inner.write_record(R::COLUMNS)?;
        }
        debug!(path = %path.display(), ?mode, new = is_empty, "Opened table");

        Ok(Self {
            inner,
            rows: 0,
            _row: PhantomData,
        })
    }

    pub fn write(&mut self, row: &R) -> Result<()> {
        self.inner.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        for row in rows {
            self.write(row)?;
        }
        Ok(())
    }

    /// Flush and return the number of rows written through this writer.
    pub fn finish(mut self) -> Result<usize> {
        self.inner.flush()?;
        Ok(self.rows)
    }
}

/// Write a whole table in one go, refusing to replace an existing file.
pub fn write_table<R: Table>(path: impl AsRef<Path>, rows: &[R]) -> Result<usize> {
    let mut writer = TableWriter::open(path, WriteMode::CreateNew)?;
    writer.write_all(rows)?;
    writer.finish()
}

pub fn read_table<R: Table>(path: impl AsRef<Path>) -> Result<Vec<R>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new().delimiter(b'\t').from_path(path)?;

    let header = reader.headers()?;
    if !header.iter().eq(R::COLUMNS.iter().copied()) {
        return Err(Error::malformed(format!(
            "{}: header does not match expected columns",
            path.display()
        )));
    }

    let rows = reader.deserialize().collect::<std::result::Result<Vec<R>, _>>()?;
    Ok(rows)
}
