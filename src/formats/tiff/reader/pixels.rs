//! Sample decoding and predictor reversal

use crate::error::{Error, Result};
use crate::io::ByteOrder;
use crate::io::byte_order::take;
use crate::types::DataType;

/// Handles sample-level operations on decoded chunk buffers
pub struct PixelReader;

impl PixelReader {
    /// Reads sample `index` of a decoded buffer as f64
    pub fn sample(buffer: &[u8], index: usize, data_type: DataType, order: ByteOrder) -> Result<f64> {
        let offset = index * data_type.size();

        let value = match data_type {
            DataType::U8 => take::<1>(buffer, offset)?[0] as f64,
            DataType::I8 => take::<1>(buffer, offset)?[0] as i8 as f64,
            DataType::U16 => order.u16(take(buffer, offset)?) as f64,
            DataType::I16 => order.u16(take(buffer, offset)?) as i16 as f64,
            DataType::U32 => order.u32(take(buffer, offset)?) as f64,
            DataType::I32 => order.u32(take(buffer, offset)?) as i32 as f64,
            DataType::U64 => order.u64(take(buffer, offset)?) as f64,
            DataType::I64 => order.u64(take(buffer, offset)?) as i64 as f64,
            DataType::F32 => order.f32(take(buffer, offset)?) as f64,
            DataType::F64 => order.f64(take(buffer, offset)?),
        };

        Ok(value)
    }

    /// Reverses TIFF horizontal differencing (Predictor = 2) in place
    ///
    /// `stride` is the number of samples per pixel in the buffer; each sample
    /// is accumulated onto the same sample of the previous pixel in its row.
    pub fn undo_horizontal_predictor(
        buffer: &mut [u8],
        row_pixels: usize,
        stride: usize,
        sample_size: usize,
        order: ByteOrder,
    ) -> Result<()> {
        if !matches!(sample_size, 1 | 2 | 4 | 8) {
            return Err(Error::Unsupported(format!(
                "Horizontal predictor for {}-byte samples",
                sample_size
            )));
        }

        let row_bytes = row_pixels * stride * sample_size;
        if row_bytes == 0 {
            return Ok(());
        }

        let mask = if sample_size == 8 { u64::MAX } else { (1u64 << (8 * sample_size)) - 1 };

        for row in buffer.chunks_exact_mut(row_bytes) {
            let samples = row_pixels * stride;
            for i in stride..samples {
                let prev = read_uint(&row[(i - stride) * sample_size..][..sample_size], order);
                let cur = read_uint(&row[i * sample_size..][..sample_size], order);
                write_uint(&mut row[i * sample_size..][..sample_size], cur.wrapping_add(prev) & mask, order);
            }
        }

        Ok(())
    }
}

fn read_uint(bytes: &[u8], order: ByteOrder) -> u64 {
    match order {
        ByteOrder::LittleEndian => bytes.iter().rev().fold(0, |acc, &b| (acc << 8) | b as u64),
        ByteOrder::BigEndian => bytes.iter().fold(0, |acc, &b| (acc << 8) | b as u64),
    }
}

fn write_uint(bytes: &mut [u8], value: u64, order: ByteOrder) {
    let len = bytes.len();
    for (i, byte) in bytes.iter_mut().enumerate() {
        let shift = match order {
            ByteOrder::LittleEndian => 8 * i,
            ByteOrder::BigEndian => 8 * (len - 1 - i),
        };
        *byte = (value >> shift) as u8;
    }
}
