use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| "mmap failed")?;
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if ext == "gz" {
            return Ok(InputKind::Gzip);
        }
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| "failed to read magic bytes")?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

pub fn open_gzip_reader(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn plain_file_is_plain() {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(b"a,b\n1,2\n").unwrap();
        assert_eq!(detect_input_kind(f.path()).unwrap(), InputKind::Plain);

        let src = MmapSource::open(f.path()).unwrap();
        assert_eq!(src.bytes().len(), 8);
        assert_eq!(&src.bytes()[..3], b"a,b");
    }

    #[test]
    fn gzip_detected_by_magic_without_extension() {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"x\n1\n").unwrap();
        f.write_all(&enc.finish().unwrap()).unwrap();
        assert_eq!(detect_input_kind(f.path()).unwrap(), InputKind::Gzip);

        let mut text = String::new();
        open_gzip_reader(f.path())
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "x\n1\n");
    }

    #[test]
    fn gz_extension_wins() {
        let f = tempfile::Builder::new().suffix(".csv.GZ").tempfile().unwrap();
        assert_eq!(detect_input_kind(f.path()).unwrap(), InputKind::Gzip);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = detect_input_kind(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }
}
