use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::*;
use crate::store::{KeyValueStore, MemoryStore};

/// A [`KeyValueStore`] kept in a CSV file, one record per key: `key,v0,v1,...`.
///
/// Writes go to memory; [`flush`](KeyValueStore::flush) rewrites the whole file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: Option<PathBuf>,
    entries: MemoryStore,
}

impl CsvStore {
    /// Open the store at `path`. A missing file gives an empty store that will be created on
    /// the first flush.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<CsvStore> {
        let path = path.as_ref().to_path_buf();
        let entries = match File::open(&path) {
            Ok(file) => read_entries(file)?,
            Err(ref err) if err.kind() == io::ErrorKind::NotFound => MemoryStore::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(CsvStore { path: Some(path), entries })
    }

    /// A store read from `rdr` and not tied to any file; flushing it is a no-op.
    pub fn from_reader<R: Read>(rdr: R) -> Result<CsvStore> {
        Ok(CsvStore { path: None, entries: read_entries(rdr)? })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write all records to `wtr`, keys in sorted order.
    pub fn write_to<W: Write>(&self, wtr: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new().flexible(true).from_writer(wtr);
        for key in self.entries.keys() {
            let values = self.entries.get(key)?.unwrap_or_default();
            let mut record = Vec::with_capacity(values.len() + 1);
            record.push(key.to_string());
            record.extend(values.iter().map(|v| v.to_string()));
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl KeyValueStore for CsvStore {
    fn put(&mut self, key: &str, values: Vec<f64>) -> Result<()> {
        self.entries.put(key, values)
    }
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>> {
        self.entries.get(key)
    }
    fn flush(&mut self) -> Result<()> {
        match self.path {
            Some(ref path) => self.write_to(File::create(path)?),
            None => Ok(()),
        }
    }
}

fn read_entries<R: Read>(rdr: R) -> Result<MemoryStore> {
    let mut csv_reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(rdr);
    let mut entries = MemoryStore::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let key = match fields.next() {
            Some(key) if !key.is_empty() => key,
            _ => continue,
        };
        let values = fields
            .map(|field| {
                field.trim().parse::<f64>().map_err(|err| {
                    HmmError::Parse(format!("value {:?} under key {}: {}", field, key, err))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        entries.put(key, values)?;
    }
    Ok(entries)
}
