//! File helpers shared by dataset and model persistence.
//!
//! Paths ending in `.gz` are transparently gzip-compressed on write and
//! decompressed on read; everything else is plain.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

const READER_BUF_CAP: usize = 128 * 1024;

pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Opens `path` for buffered reading, failing with `Error::NotFound` when it
/// does not exist.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    if !path.is_file() {
        return Err(Error::NotFound { path: path.to_path_buf() });
    }
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    if is_gzip_path(path) {
        let dec = GzDecoder::new(file);
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, dec)));
    }
    Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, file)))
}

/// Writer that must be closed so compression trailers and flush errors
/// are not silently lost.
#[must_use = "call .close() to propagate compression/IO errors"]
pub enum Writer {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Writer::Plain(f) => f.write(buf),
            Writer::Gz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::Plain(f) => f.flush(),
            Writer::Gz(e) => e.flush(),
        }
    }
}

impl Writer {
    pub fn close(self) -> io::Result<()> {
        match self {
            Writer::Plain(mut f) => f.flush(),
            Writer::Gz(e) => {
                let mut inner = e.finish()?;
                inner.flush()
            }
        }
    }
}

fn open_writer(path: &Path, gzip: bool) -> Result<Writer> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let buffered = BufWriter::new(file);
    if gzip {
        return Ok(Writer::Gz(GzEncoder::new(buffered, Compression::default())));
    }
    Ok(Writer::Plain(buffered))
}

/// Sibling of `path` used while a replacement is being written.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("out"));
    name.push(format!(".tmp.{}", std::process::id()));
    path.with_file_name(name)
}

/// Serializes `value` as JSON to `path`, compressing when the path ends in `.gz`.
///
/// The data goes to a temporary sibling first and is renamed over `path`, so
/// an interrupted write leaves any previous file intact.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = temp_sibling(path);
    let written = write_json_to(&tmp, is_gzip_path(path), value)
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| Error::io(path, e)));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn write_json_to<T: serde::Serialize>(tmp: &Path, gzip: bool, value: &T) -> Result<()> {
    let mut writer = open_writer(tmp, gzip)?;
    serde_json::to_writer(&mut writer, value).map_err(|e| Error::json(tmp, e))?;
    writer.close().map_err(|e| Error::io(tmp, e))
}

/// Reads a JSON value written by [`write_json`].
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = open_reader(path)?;
    serde_json::from_reader(reader).map_err(|e| Error::json(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_detection_is_case_insensitive() {
        assert!(is_gzip_path(Path::new("mnist.json.gz")));
        assert!(is_gzip_path(Path::new("MNIST.GZ")));
        assert!(!is_gzip_path(Path::new("best_model.json")));
        assert!(!is_gzip_path(Path::new("gz")));
    }

    #[test]
    fn json_survives_compressed_and_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["values.json", "values.json.gz"] {
            let path = dir.path().join(name);
            write_json(&path, &vec![1.5f32, 0.0, 0.25]).unwrap();
            let back: Vec<f32> = read_json(&path).unwrap();
            assert_eq!(back, vec![1.5, 0.0, 0.25]);
        }
    }

    #[test]
    fn failed_write_keeps_the_previous_file() {
        use std::collections::BTreeMap;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model.json.gz");
        write_json(&path, &vec![1.0f32, 2.0]).unwrap();

        // JSON object keys must be strings, so this fails mid-serialization.
        let bad: BTreeMap<Vec<u8>, u8> = BTreeMap::from([(vec![1], 1)]);
        assert!(write_json(&path, &bad).is_err());

        let kept: Vec<f32> = read_json(&path).unwrap();
        assert_eq!(kept, vec![1.0, 2.0]);
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn overwrite_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.json");
        write_json(&path, &vec![1u8]).unwrap();
        write_json(&path, &vec![2u8, 3]).unwrap();
        assert_eq!(read_json::<Vec<u8>>(&path).unwrap(), vec![2, 3]);
        assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json.gz");
        match read_json::<Vec<f32>>(&path) {
            Err(Error::NotFound { path: p }) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }
}
