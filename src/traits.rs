//! Traits for reading and writing GRD trees, and the seam post-processing passes plug into.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::{error::Error, types::GrdTree};

/// A trait for parsing and writing one resource file.
///
/// # Example
///
/// ```rust,no_run
/// use grdpost::{GrdTree, traits::Parser};
/// let tree = GrdTree::read_from("toolbar.grd")?;
/// tree.write_to("toolbar_copy.grd")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.to_writer(writer)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Serialize into a string.
    fn write_to_string(&self) -> Result<String, Error> {
        let mut out = Vec::new();
        self.to_writer(&mut out)?;
        String::from_utf8(out).map_err(|e| Error::InvalidResource(e.to_string()))
    }
}

/// A pass run over a freshly converted GRD tree by the host pipeline.
///
/// `rc_text` is the contents of the RC file the tree was converted from and
/// `rc_path` the path it was read from.
pub trait PostProcessor {
    fn process(&self, rc_text: &str, rc_path: &str, tree: GrdTree) -> Result<GrdTree, Error>;
}
