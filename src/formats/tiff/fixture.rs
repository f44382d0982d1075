//! In-memory TIFF writer for decoder tests

use std::collections::BTreeMap;

use crate::io::ByteOrder;
use super::tags::{self, field_types};

/// Assembles a single-IFD TIFF byte stream
pub(crate) struct TiffBuilder {
    order: ByteOrder,
    big_tiff: bool,
    entries: BTreeMap<u16, (u16, u64, Vec<u8>)>,
    chunks: Vec<Vec<u8>>,
    tiled: bool,
}

impl TiffBuilder {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            order,
            big_tiff: false,
            entries: BTreeMap::new(),
            chunks: Vec::new(),
            tiled: false,
        }
    }

    /// Single-band, uncompressed image of `width` x `height` samples
    pub fn image(order: ByteOrder, width: u32, height: u32, bits: u16, sample_format: u16) -> Self {
        Self::new(order)
            .longs(tags::IMAGE_WIDTH, &[width])
            .longs(tags::IMAGE_LENGTH, &[height])
            .shorts(tags::BITS_PER_SAMPLE, &[bits])
            .shorts(tags::SAMPLE_FORMAT, &[sample_format])
    }

    pub fn big_tiff(mut self) -> Self {
        self.big_tiff = true;
        self
    }

    fn put(&self, out: &mut Vec<u8>, value: u64, size: usize) {
        let bytes = match self.order {
            ByteOrder::LittleEndian => value.to_le_bytes()[..size].to_vec(),
            ByteOrder::BigEndian => value.to_be_bytes()[8 - size..].to_vec(),
        };
        out.extend_from_slice(&bytes);
    }

    fn entry(mut self, tag: u16, field_type: u16, count: u64, payload: Vec<u8>) -> Self {
        self.entries.insert(tag, (field_type, count, payload));
        self
    }

    pub fn shorts(self, tag: u16, values: &[u16]) -> Self {
        let mut payload = Vec::new();
        for &v in values {
            self.put(&mut payload, v as u64, 2);
        }
        self.entry(tag, field_types::SHORT, values.len() as u64, payload)
    }

    pub fn longs(self, tag: u16, values: &[u32]) -> Self {
        let mut payload = Vec::new();
        for &v in values {
            self.put(&mut payload, v as u64, 4);
        }
        self.entry(tag, field_types::LONG, values.len() as u64, payload)
    }

    pub fn doubles(self, tag: u16, values: &[f64]) -> Self {
        let mut payload = Vec::new();
        for &v in values {
            self.put(&mut payload, v.to_bits(), 8);
        }
        self.entry(tag, field_types::DOUBLE, values.len() as u64, payload)
    }

    pub fn ascii(self, tag: u16, text: &str) -> Self {
        let mut payload = text.as_bytes().to_vec();
        payload.push(0);
        let count = payload.len() as u64;
        self.entry(tag, field_types::ASCII, count, payload)
    }

    /// Strip payloads, already compressed and predicted as tagged
    pub fn strips(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self.tiled = false;
        self
    }

    /// Tile payloads, already compressed and predicted as tagged
    pub fn tiles(mut self, tile_width: u32, tile_height: u32, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self.tiled = true;
        self.longs(tags::TILE_WIDTH, &[tile_width])
            .longs(tags::TILE_LENGTH, &[tile_height])
    }

    /// Encodes samples in the builder's byte order
    pub fn encode_u16(&self, values: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        for &v in values {
            self.put(&mut out, v as u64, 2);
        }
        out
    }

    pub fn encode_f32(&self, values: &[f32]) -> Vec<u8> {
        let mut out = Vec::new();
        for &v in values {
            self.put(&mut out, v.to_bits() as u64, 4);
        }
        out
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(match self.order {
            ByteOrder::LittleEndian => b"II",
            ByteOrder::BigEndian => b"MM",
        });

        let (offset_size, header_ptr) = if self.big_tiff {
            self.put(&mut out, 43, 2);
            self.put(&mut out, 8, 2);
            self.put(&mut out, 0, 2);
            (8, 8)
        } else {
            self.put(&mut out, 42, 2);
            (4, 4)
        };
        self.put(&mut out, 0, offset_size);

        let mut offsets = Vec::new();
        let mut counts = Vec::new();
        for chunk in &self.chunks {
            offsets.push(out.len() as u32);
            counts.push(chunk.len() as u32);
            out.extend_from_slice(chunk);
        }

        let builder = if self.chunks.is_empty() {
            self
        } else if self.tiled {
            self.longs(tags::TILE_OFFSETS, &offsets)
                .longs(tags::TILE_BYTE_COUNTS, &counts)
        } else {
            self.longs(tags::STRIP_OFFSETS, &offsets)
                .longs(tags::STRIP_BYTE_COUNTS, &counts)
        };

        if out.len() % 2 == 1 {
            out.push(0);
        }

        let mut fields = Vec::new();
        for (&tag, (field_type, count, payload)) in &builder.entries {
            let mut field = Vec::new();
            if payload.len() <= offset_size {
                field.extend_from_slice(payload);
                field.resize(offset_size, 0);
            } else {
                let offset = out.len() as u64;
                out.extend_from_slice(payload);
                if out.len() % 2 == 1 {
                    out.push(0);
                }
                builder.put(&mut field, offset, offset_size);
            }
            fields.push((tag, *field_type, *count, field));
        }

        let ifd_offset = out.len() as u64;
        builder.put(&mut out, fields.len() as u64, if builder.big_tiff { 8 } else { 2 });
        for (tag, field_type, count, field) in fields {
            builder.put(&mut out, tag as u64, 2);
            builder.put(&mut out, field_type as u64, 2);
            builder.put(&mut out, count, offset_size);
            out.extend_from_slice(&field);
        }
        builder.put(&mut out, 0, offset_size);

        let mut pointer = Vec::new();
        builder.put(&mut pointer, ifd_offset, offset_size);
        out[header_ptr..header_ptr + offset_size].copy_from_slice(&pointer);

        out
    }
}
