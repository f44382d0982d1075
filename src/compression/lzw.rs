//! LZW decompression
//!
//! TIFF flavour of LZW: codes are packed most-significant-bit first, start at
//! 9 bits, and widen one code early (at 511, 1023 and 2047).

use crate::error::{Error, Result};

const CLEAR_CODE: u16 = 256;
const END_OF_INFORMATION: u16 = 257;
const FIRST_FREE_CODE: usize = 258;
const MAX_CODE_WIDTH: u8 = 12;

/// Decompresses one LZW block
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    LzwDecoder::new().decode(data, expected_len)
}

struct LzwDecoder {
    table: Vec<Vec<u8>>,
    code_width: u8,
}

impl LzwDecoder {
    fn new() -> Self {
        let mut table = Vec::with_capacity(1 << MAX_CODE_WIDTH);
        table.extend((0..=255u8).map(|byte| vec![byte]));
        // 256 and 257 are control codes and never looked up
        table.push(Vec::new());
        table.push(Vec::new());

        Self {
            table,
            code_width: 9,
        }
    }

    fn reset(&mut self) {
        self.table.truncate(FIRST_FREE_CODE);
        self.code_width = 9;
    }

    fn decode(&mut self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(expected_len);
        let mut bits = MsbBitReader::new(data);
        let mut previous: Option<usize> = None;

        while let Some(code) = bits.read(self.code_width) {
            match code {
                END_OF_INFORMATION => break,
                CLEAR_CODE => {
                    self.reset();
                    previous = None;
                    continue;
                }
                _ => {}
            }

            let code = code as usize;
            let entry = match previous {
                None => self.lookup(code)?.clone(),
                Some(prev) if code < self.table.len() => {
                    let entry = self.lookup(code)?.clone();
                    self.push_entry(prev, entry[0]);
                    entry
                }
                Some(prev) if code == self.table.len() => {
                    let first = self.lookup(prev)?[0];
                    self.push_entry(prev, first);
                    self.table[code].clone()
                }
                Some(_) => {
                    return Err(Error::InvalidFormat(format!("Invalid LZW code: {}", code)));
                }
            };

            output.extend_from_slice(&entry);
            previous = Some(code);

            if output.len() >= expected_len {
                break;
            }
        }

        Ok(output)
    }

    fn lookup(&self, code: usize) -> Result<&Vec<u8>> {
        self.table
            .get(code)
            .filter(|entry| !entry.is_empty())
            .ok_or_else(|| Error::InvalidFormat(format!("Invalid LZW code: {}", code)))
    }

    fn push_entry(&mut self, prefix: usize, next_byte: u8) {
        if self.table.len() >= 1 << MAX_CODE_WIDTH {
            return;
        }

        let mut entry = self.table[prefix].clone();
        entry.push(next_byte);
        self.table.push(entry);

        if self.table.len() + 1 >= 1 << self.code_width && self.code_width < MAX_CODE_WIDTH {
            self.code_width += 1;
        }
    }
}

/// Reads variable-width codes, most significant bit first
struct MsbBitReader<'a> {
    data: &'a [u8],
    bit_position: usize,
}

impl<'a> MsbBitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    fn read(&mut self, width: u8) -> Option<u16> {
        if self.bit_position + width as usize > self.data.len() * 8 {
            return None;
        }

        let mut code = 0u16;
        for _ in 0..width {
            let byte = self.data[self.bit_position / 8];
            let bit = (byte >> (7 - self.bit_position % 8)) & 1;
            code = (code << 1) | bit as u16;
            self.bit_position += 1;
        }

        Some(code)
    }
}
