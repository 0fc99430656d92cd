//! Transcoding readers.
//!
//! The CSV tokenizer only understands UTF-8, so every input goes through a
//! `DecodingReader` that turns the detected encoding into UTF-8 on the fly.
//! A leading BOM is dropped and malformed input surfaces as `InvalidData`
//! instead of being silently replaced.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use encoding_rs::{Decoder, DecoderResult, Encoding};

/// Raw bytes pulled from the underlying reader per refill.
const RAW_CHUNK: usize = 64 * 1024;

pub struct DecodingReader<R: Read> {
    inner: R,
    encoding: &'static Encoding,
    decoder: Decoder,
    raw: Vec<u8>,
    raw_start: usize,
    raw_end: usize,
    out: Vec<u8>,
    out_start: usize,
    out_end: usize,
    // total raw bytes handed to the decoder, for error offsets
    consumed: u64,
    eof: bool,
    finished: bool,
}

impl<R: Read> DecodingReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        let decoder = encoding.new_decoder_with_bom_removal();
        let out_cap = decoder
            .max_utf8_buffer_length_without_replacement(RAW_CHUNK)
            .unwrap_or(RAW_CHUNK * 3 + 16);
        Self {
            inner,
            encoding,
            decoder,
            raw: vec![0u8; RAW_CHUNK],
            raw_start: 0,
            raw_end: 0,
            out: vec![0u8; out_cap],
            out_start: 0,
            out_end: 0,
            consumed: 0,
            eof: false,
            finished: false,
        }
    }

    fn refill_raw(&mut self) -> io::Result<()> {
        loop {
            match self.inner.read(&mut self.raw) {
                Ok(0) => {
                    self.eof = true;
                    self.raw_start = 0;
                    self.raw_end = 0;
                    return Ok(());
                }
                Ok(n) => {
                    self.raw_start = 0;
                    self.raw_end = n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn decode_step(&mut self) -> io::Result<()> {
        let src = &self.raw[self.raw_start..self.raw_end];
        let (result, read, written) =
            self.decoder
                .decode_to_utf8_without_replacement(src, &mut self.out, self.eof);
        self.raw_start += read;
        self.consumed += read as u64;
        self.out_start = 0;
        self.out_end = written;
        match result {
            DecoderResult::InputEmpty => {
                if self.eof {
                    self.finished = true;
                }
                Ok(())
            }
            DecoderResult::OutputFull => Ok(()),
            DecoderResult::Malformed(bad, _) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "input is not valid {}: malformed byte sequence ending near byte {}",
                    self.encoding.name(),
                    self.consumed.saturating_sub(u64::from(bad)),
                ),
            )),
        }
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.out_start < self.out_end {
                let n = (self.out_end - self.out_start).min(buf.len());
                buf[..n].copy_from_slice(&self.out[self.out_start..self.out_start + n]);
                self.out_start += n;
                return Ok(n);
            }
            if self.finished || buf.is_empty() {
                return Ok(0);
            }
            if self.raw_start == self.raw_end && !self.eof {
                self.refill_raw()?;
            }
            self.decode_step()?;
        }
    }
}

/// Open `path` as UTF-8 text decoded from `encoding`, buffered with
/// `capacity` bytes to bound the in-flight data handed to the tokenizer.
pub fn open_decoded<P: AsRef<Path>>(
    path: P,
    encoding: &'static Encoding,
    capacity: usize,
) -> io::Result<BufReader<DecodingReader<File>>> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(
        capacity,
        DecodingReader::new(file, encoding),
    ))
}
