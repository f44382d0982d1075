//! Core data types shared by the decoder and the raster grid

/// Sample types a raster band can be stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Unsigned 64-bit integer, widened to f64 with possible precision loss
    U64,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer, widened like U64
    I64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

impl DataType {
    /// Resolves the type from TIFF SampleFormat (1=unsigned, 2=signed, 3=float)
    /// and BitsPerSample
    pub fn from_format(sample_format: u64, bits: u64) -> Option<Self> {
        match (sample_format, bits) {
            (1, 8) => Some(DataType::U8),
            (1, 16) => Some(DataType::U16),
            (1, 32) => Some(DataType::U32),
            (1, 64) => Some(DataType::U64),
            (2, 8) => Some(DataType::I8),
            (2, 16) => Some(DataType::I16),
            (2, 32) => Some(DataType::I32),
            (2, 64) => Some(DataType::I64),
            (3, 32) => Some(DataType::F32),
            (3, 64) => Some(DataType::F64),
            _ => None,
        }
    }

    /// Bytes per sample
    pub fn size(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::U64 | DataType::I64 | DataType::F64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::U8 => "uint8",
            DataType::U16 => "uint16",
            DataType::U32 => "uint32",
            DataType::U64 => "uint64",
            DataType::I8 => "int8",
            DataType::I16 => "int16",
            DataType::I32 => "int32",
            DataType::I64 => "int64",
            DataType::F32 => "float32",
            DataType::F64 => "float64",
        }
    }
}

/// Image or block dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u64,
    pub height: u64,
}

impl Dimensions {
    pub fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width * self.height
    }
}
