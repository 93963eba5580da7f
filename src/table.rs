use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::compression::{compress_writer, Compression};

/// A sequence of variable-length rows stored in one flat buffer
///
/// Row `i` occupies `flat[offsets[i]..offsets[i + 1]]`, so there is
/// always one more offset than there are rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jagged<T> {
    flat: Vec<T>,
    offsets: Vec<usize>,
}

impl<T> Default for Jagged<T> {
    fn default() -> Self {
        Self {
            flat: Vec::new(),
            offsets: vec![0],
        }
    }
}

impl<T> Jagged<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat buffer and row offsets
    ///
    /// Returns `None` unless the offsets start at zero, never decrease,
    /// and end at the length of the flat buffer.
    pub fn from_parts(flat: Vec<T>, offsets: Vec<usize>) -> Option<Self> {
        let valid = offsets.first() == Some(&0)
            && offsets.last() == Some(&flat.len())
            && offsets.windows(2).all(|w| w[0] <= w[1]);
        valid.then_some(Self { flat, offsets })
    }

    pub fn into_parts(self) -> (Vec<T>, Vec<usize>) {
        (self.flat, self.offsets)
    }

    pub fn push_row<I: IntoIterator<Item = T>>(&mut self, row: I) {
        self.flat.extend(row);
        self.offsets.push(self.flat.len());
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, idx: usize) -> Option<&[T]> {
        if idx < self.len() {
            Some(&self.flat[self.offsets[idx]..self.offsets[idx + 1]])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        self.offsets.windows(2).map(|w| &self.flat[w[0]..w[1]])
    }

    pub fn flat(&self) -> &[T] {
        &self.flat
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }
}

impl<T> FromIterator<Vec<T>> for Jagged<T> {
    fn from_iter<I: IntoIterator<Item = Vec<T>>>(iter: I) -> Self {
        let mut res = Self::new();
        for row in iter {
            res.push_row(row);
        }
        res
    }
}

impl<T: Serialize> Serialize for Jagged<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(self.rows())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Jagged<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<T>>::deserialize(d)?;
        Ok(rows.into_iter().collect())
    }
}

/// A named column in a [Table]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i32>),
    JaggedFloat(Jagged<f64>),
    JaggedInt(Jagged<i32>),
}

impl Column {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            Column::Float(c) => c.len(),
            Column::Int(c) => c.len(),
            Column::JaggedFloat(c) => c.len(),
            Column::JaggedInt(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Int(_) => "int",
            Column::JaggedFloat(_) => "jagged float",
            Column::JaggedInt(_) => "jagged int",
        }
    }
}

/// A set of named columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    columns: BTreeMap<String, Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, returning any previous column with the same name
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Option<Column> {
        self.columns.insert(name.into(), column)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        self.columns.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of rows, taken from the first column
    pub fn n_rows(&self) -> usize {
        self.columns.values().next().map(|c| c.len()).unwrap_or_default()
    }
}

/// A collection of named tables as stored in a single file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableFile {
    tables: BTreeMap<String, Table>,
}

impl TableFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        table: Table,
    ) -> Option<Table> {
        self.tables.insert(name.into(), table)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn take(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }

    /// Read from a (potentially compressed) file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        debug!("Reading tables from {path:?}");
        let file = File::open(path).map_err(|source| TableError::Open {
            path: path.to_owned(),
            source,
        })?;
        let reader = auto_decompress(BufReader::new(file));
        serde_yaml::from_reader(reader).map_err(|source| TableError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Write to a file with optional compression
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        compression: Option<Compression>,
    ) -> Result<(), TableError> {
        let path = path.as_ref();
        info!("Writing tables {:?} to {path:?}", self.tables.keys());
        let file = File::create(path).map_err(|source| TableError::Create {
            path: path.to_owned(),
            source,
        })?;
        let mut writer = compress_writer(BufWriter::new(file), compression)?;
        serde_yaml::to_writer(&mut writer, self).map_err(|source| {
            TableError::Serialise {
                path: path.to_owned(),
                source,
            }
        })?;
        writer.flush()?;
        Ok(())
    }
}

/// Read a single named table from a file
pub fn read_table(
    path: impl AsRef<Path>,
    name: &str,
) -> Result<Table, TableError> {
    let path = path.as_ref();
    let mut file = TableFile::read(path)?;
    file.take(name).ok_or_else(|| TableError::MissingTable {
        table: name.to_owned(),
        path: path.to_owned(),
    })
}

/// Write a single named table to a file
pub fn write_table(
    path: impl AsRef<Path>,
    name: &str,
    table: Table,
    compression: Option<Compression>,
) -> Result<(), TableError> {
    let mut file = TableFile::new();
    file.insert(name, table);
    file.write(path, compression)
}

/// Error reading or writing tables
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create {path:?}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse tables in {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to serialise tables to {path:?}")]
    Serialise {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("No table `{table}` in {path:?}")]
    MissingTable { table: String, path: PathBuf },
    #[error("I/O error")]
    IOError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn jagged_rows() {
        let jagged: Jagged<i32> =
            [vec![1, 2], vec![], vec![3]].into_iter().collect();
        assert_eq!(jagged.len(), 3);
        assert_eq!(jagged.offsets(), &[0, 2, 2, 3]);
        assert_eq!(jagged.row(0), Some([1, 2].as_slice()));
        assert_eq!(jagged.row(1), Some([].as_slice()));
        assert_eq!(jagged.row(3), None);
        assert_eq!(jagged.rows().count(), 3);
    }

    #[test]
    fn jagged_from_parts() {
        assert!(Jagged::from_parts(vec![1., 2.], vec![0, 2]).is_some());
        assert!(Jagged::from_parts(vec![1., 2.], vec![0, 1]).is_none());
        assert!(Jagged::from_parts(vec![1., 2.], vec![1, 2]).is_none());
        assert!(Jagged::from_parts(vec![1., 2.], vec![0, 2, 1, 2]).is_none());
        assert!(Jagged::<f64>::from_parts(vec![], vec![]).is_none());
    }

    #[test]
    fn file_io() {
        log_init();

        let mut table = Table::new();
        table.insert("x", Column::Float(vec![0.1, -3.5e10, 7.]));
        table.insert(
            "ids",
            Column::JaggedInt([vec![11, -11], vec![], vec![22]].into_iter().collect()),
        );
        assert_eq!(table.n_rows(), 3);

        let dir = tempfile::tempdir().unwrap();
        for (name, compression) in [
            ("plain.yaml", None),
            ("compressed.yaml.gz", Some(Compression::Gzip(6))),
            ("compressed.yaml.zst", Some(Compression::Zstd(0))),
            ("compressed.yaml.bz2", Some(Compression::Bzip2)),
        ] {
            let path = dir.path().join(name);
            write_table(&path, "events", table.clone(), compression).unwrap();
            let read = read_table(&path, "events").unwrap();
            assert_eq!(read, table);

            let err = read_table(&path, "derived").unwrap_err();
            assert!(matches!(err, TableError::MissingTable { .. }));
        }
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TableFile::read(dir.path().join("nothing.yaml")).unwrap_err();
        assert!(matches!(err, TableError::Open { .. }));
    }
}
