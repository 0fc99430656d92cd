//! Encoding detection over a bounded sample from the start of a file.
//!
//! BOMs are trusted first, then a pure-ASCII sample short-circuits to UTF-8,
//! and only then does `chardetng` run its statistical guess. An empty sample
//! carries no signal and resolves to the configured fallback label.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use medium_core::config::{ConvertConfig, DEFAULT_SAMPLE_SIZE};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Maximum bytes read from the start of the file.
    pub sample_size: usize,
    /// Label used when the sample is empty.
    pub fallback: String,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            fallback: "utf-8".to_string(),
        }
    }
}

impl DetectOptions {
    pub fn from_config(cfg: &ConvertConfig) -> Self {
        Self {
            sample_size: cfg.sample_size,
            fallback: cfg.fallback_encoding.clone(),
        }
    }
}

/// How an [`EncodingLabel`] was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    Bom,
    Ascii,
    Heuristic,
    Fallback,
    Explicit,
}

/// A resolved character encoding for one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingLabel {
    encoding: &'static Encoding,
    source: DetectionSource,
    confident: bool,
}

impl EncodingLabel {
    fn new(encoding: &'static Encoding, source: DetectionSource, confident: bool) -> Self {
        Self {
            encoding,
            source,
            confident,
        }
    }

    /// Canonical WHATWG name, e.g. `UTF-8` or `windows-1252`.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn source(&self) -> DetectionSource {
        self.source
    }

    pub fn is_confident(&self) -> bool {
        self.confident
    }

    pub fn is_ascii_compatible(&self) -> bool {
        self.encoding.is_ascii_compatible()
    }
}

impl fmt::Display for EncodingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a user-supplied label (`latin1`, `utf8`, `cp1252`, ...).
pub fn resolve_label(label: &str) -> Result<EncodingLabel> {
    Encoding::for_label(label.trim().as_bytes())
        .map(|enc| EncodingLabel::new(enc, DetectionSource::Explicit, true))
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

/// Detect the encoding of the file at `path` from its first
/// `opts.sample_size` bytes.
pub fn detect_encoding<P: AsRef<Path>>(path: P, opts: &DetectOptions) -> Result<EncodingLabel> {
    let path = path.as_ref();
    let (sample, hit_eof) = read_sample(path, opts.sample_size).map_err(|source| Error::Detect {
        path: path.display().to_string(),
        source,
    })?;
    detect_from_sample(&sample, hit_eof, opts)
}

/// Run detection over an in-memory sample. `hit_eof` tells the heuristic
/// whether a trailing partial sequence is truncation or a real error.
pub fn detect_from_sample(sample: &[u8], hit_eof: bool, opts: &DetectOptions) -> Result<EncodingLabel> {
    if let Some((enc, _bom_len)) = Encoding::for_bom(sample) {
        return Ok(EncodingLabel::new(enc, DetectionSource::Bom, true));
    }

    if sample.is_empty() {
        let fallback = resolve_label(&opts.fallback)?;
        return Ok(EncodingLabel::new(
            fallback.encoding,
            DetectionSource::Fallback,
            false,
        ));
    }

    if Encoding::ascii_valid_up_to(sample) == sample.len() {
        return Ok(EncodingLabel::new(UTF_8, DetectionSource::Ascii, true));
    }

    let mut detector = EncodingDetector::new();
    // The non-ASCII hint is redundant: the ASCII case already returned.
    detector.feed(sample, hit_eof);
    let (enc, confident) = detector.guess_assess(None, true);
    Ok(EncodingLabel::new(enc, DetectionSource::Heuristic, confident))
}

fn read_sample(path: &Path, limit: usize) -> io::Result<(Vec<u8>, bool)> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(limit.min(64 * 1024));
    // One byte past the limit tells us whether the sample is the whole file.
    file.take(limit as u64 + 1).read_to_end(&mut sample)?;
    let hit_eof = sample.len() <= limit;
    sample.truncate(limit);
    Ok((sample, hit_eof))
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, WINDOWS_1252};
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn ascii_sample_is_utf8() {
        let f = write_temp(b"a,b\n1,2\n3,4\n");
        let label = detect_encoding(f.path(), &DetectOptions::default()).unwrap();
        assert_eq!(label.encoding(), UTF_8);
        assert_eq!(label.source(), DetectionSource::Ascii);
        assert!(label.is_ascii_compatible());
    }

    #[test]
    fn utf8_with_accents_is_utf8() {
        let f = write_temp("name,city\nJosé,São Paulo\nZoë,Zürich\n".as_bytes());
        let label = detect_encoding(f.path(), &DetectOptions::default()).unwrap();
        assert_eq!(label.encoding(), UTF_8);
        assert_eq!(label.source(), DetectionSource::Heuristic);
    }

    #[test]
    fn latin1_bytes_are_detected_as_single_byte_encoding() {
        let (bytes, _, _) = WINDOWS_1252.encode(
            "nom,ville\nFrançois,Besançon\nHélène,Orléans\nJérôme,Créteil\nAndré,Nîmes\n",
        );
        let f = write_temp(&bytes);
        let label = detect_encoding(f.path(), &DetectOptions::default()).unwrap();
        assert_ne!(label.encoding(), UTF_8);
        assert!(label.is_ascii_compatible());
    }

    #[test]
    fn bom_wins_over_heuristic() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "a,b\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let f = write_temp(&bytes);
        let label = detect_encoding(f.path(), &DetectOptions::default()).unwrap();
        assert_eq!(label.encoding(), UTF_16LE);
        assert_eq!(label.source(), DetectionSource::Bom);
    }

    #[test]
    fn empty_file_falls_back() {
        let f = write_temp(b"");
        let opts = DetectOptions {
            fallback: "latin1".into(),
            ..Default::default()
        };
        let label = detect_encoding(f.path(), &opts).unwrap();
        assert_eq!(label.source(), DetectionSource::Fallback);
        assert_eq!(label.encoding(), WINDOWS_1252);
        assert!(!label.is_confident());
    }

    #[test]
    fn bad_fallback_label_is_an_error() {
        let opts = DetectOptions {
            fallback: "klingon".into(),
            ..Default::default()
        };
        let err = detect_from_sample(b"", true, &opts).unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding(_)));
    }

    #[test]
    fn missing_file_is_a_detection_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = detect_encoding(&path, &DetectOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Detect { .. }));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn only_the_sample_is_read() {
        // Non-ASCII bytes beyond the sample must not influence the result.
        let mut bytes = b"id,name\n".repeat(100);
        bytes.extend_from_slice(&[0xE9, 0xE8, 0xE0]);
        let f = write_temp(&bytes);
        let opts = DetectOptions {
            sample_size: 64,
            ..Default::default()
        };
        let label = detect_encoding(f.path(), &opts).unwrap();
        assert_eq!(label.source(), DetectionSource::Ascii);
    }

    #[test]
    fn resolve_label_accepts_aliases() {
        assert_eq!(resolve_label("utf8").unwrap().encoding(), UTF_8);
        assert_eq!(resolve_label(" ISO-8859-1 ").unwrap().encoding(), WINDOWS_1252);
        assert!(resolve_label("ebcdic-nope").is_err());
    }
}
