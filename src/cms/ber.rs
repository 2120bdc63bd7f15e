//! BER to DER normalization.
//!
//! `.p7s` files produced by streaming signers use BER: indefinite lengths,
//! non-minimal long-form lengths and constructed OCTET STRINGs. The schema
//! decoder only accepts DER, so the first element of the input is rewritten
//! into its definite, minimal form before decoding. Input that is already
//! DER comes out byte-for-byte identical.

use crate::error::{Error, Result};

/// Maximum constructed nesting accepted by the normalizer.
pub const MAX_DEPTH: u32 = 64;

const TAG_OCTET_STRING: u8 = 0x04;
const TAG_OCTET_STRING_CONSTRUCTED: u8 = 0x24;
const CONSTRUCTED: u8 = 0x20;

/// Rewrite the first BER element of `input` as DER.
///
/// Bytes after the first complete element are ignored; signature blobs cut
/// out of a PDF `/Contents` entry are usually zero-padded.
pub fn to_der(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(Error::MalformedEncoding("empty input".to_string()));
    }

    let mut reader = BerReader::new(input, 0);
    let mut out = Vec::with_capacity(input.len());
    reader.element(0, &mut out)?;

    if !reader.is_empty() {
        log::debug!(
            "Ignoring {} trailing bytes after the first BER element",
            reader.remaining()
        );
    }

    Ok(out)
}

enum Length {
    Definite(usize),
    Indefinite,
}

struct BerReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Offset of `data` within the original input, for error messages
    base: usize,
}

impl<'a> BerReader<'a> {
    fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn error(&self, reason: &str) -> Error {
        Error::MalformedEncoding(format!("{} at byte {}", reason, self.base + self.pos))
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn at_end_of_contents(&self) -> bool {
        self.data.get(self.pos..self.pos + 2) == Some(&[0x00, 0x00][..])
    }

    /// Read the identifier octets, returning them verbatim.
    fn identifier(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let first = self.next_byte()?;
        if first == 0x00 {
            self.pos = start;
            return Err(self.error("unexpected end-of-contents marker"));
        }

        // High tag number form: base-128 continuation bytes
        if first & 0x1F == 0x1F {
            let mut count = 0;
            loop {
                let byte = self.next_byte()?;
                count += 1;
                if count > 4 {
                    return Err(self.error("tag number too large"));
                }
                if byte & 0x80 == 0 {
                    break;
                }
            }
        }

        let data = self.data;
        Ok(&data[start..self.pos])
    }

    fn length(&mut self) -> Result<Length> {
        let first = self.next_byte()?;
        match first {
            0x00..=0x7F => Ok(Length::Definite(first as usize)),
            0x80 => Ok(Length::Indefinite),
            0xFF => Err(self.error("reserved length octet")),
            _ => {
                let count = (first & 0x7F) as usize;
                if count > std::mem::size_of::<usize>() {
                    return Err(self.error("length does not fit in memory"));
                }
                let mut len: usize = 0;
                for _ in 0..count {
                    len = (len << 8) | self.next_byte()? as usize;
                }
                Ok(Length::Definite(len))
            },
        }
    }

    /// Consume one element and append its DER form to `out`.
    fn element(&mut self, depth: u32, out: &mut Vec<u8>) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(self.error(&format!("nesting exceeds {} levels", MAX_DEPTH)));
        }

        let identifier = self.identifier()?;
        let constructed = identifier[0] & CONSTRUCTED != 0;
        let length = self.length()?;

        if !constructed {
            let len = match length {
                Length::Definite(len) => len,
                Length::Indefinite => {
                    return Err(self.error("indefinite length on primitive element"))
                },
            };
            let value = self.take(len)?;
            out.extend_from_slice(identifier);
            write_length(out, value.len());
            out.extend_from_slice(value);
            return Ok(());
        }

        let mut content = Vec::new();
        match length {
            Length::Definite(len) => {
                let base = self.base + self.pos;
                let inner = self.take(len)?;
                let mut sub = BerReader::new(inner, base);
                while !sub.is_empty() {
                    sub.element(depth + 1, &mut content)?;
                }
            },
            Length::Indefinite => loop {
                if self.at_end_of_contents() {
                    self.pos += 2;
                    break;
                }
                if self.is_empty() {
                    return Err(self.error("missing end-of-contents marker"));
                }
                self.element(depth + 1, &mut content)?;
            },
        }

        if identifier == [TAG_OCTET_STRING_CONSTRUCTED] {
            let flattened = flatten_octet_string(&content, self.base + self.pos)?;
            out.push(TAG_OCTET_STRING);
            write_length(out, flattened.len());
            out.extend_from_slice(&flattened);
        } else {
            out.extend_from_slice(identifier);
            write_length(out, content.len());
            out.extend_from_slice(&content);
        }

        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.error("length exceeds available input"))?;
        let data = self.data;
        let value = &data[self.pos..end];
        self.pos = end;
        Ok(value)
    }
}

/// Concatenate the segments of a constructed OCTET STRING.
///
/// `segments` is already DER, so every segment is a primitive OCTET STRING
/// with a definite length.
fn flatten_octet_string(segments: &[u8], offset: usize) -> Result<Vec<u8>> {
    let mut reader = BerReader::new(segments, offset);
    let mut value = Vec::with_capacity(segments.len());
    while !reader.is_empty() {
        let identifier = reader.identifier()?;
        if identifier != [TAG_OCTET_STRING] {
            return Err(reader.error("constructed OCTET STRING segment is not an OCTET STRING"));
        }
        let len = match reader.length()? {
            Length::Definite(len) => len,
            Length::Indefinite => return Err(reader.error("indefinite length in segment")),
        };
        value.extend_from_slice(reader.take(len)?);
    }
    Ok(value)
}

fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}
