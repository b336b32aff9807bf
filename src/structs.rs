use binrw::binrw;

// note: a RIFF file is a flat sequence of {tag, size, payload} chunks, all
// multi-byte integers little endian. The RIFF chunk itself deviates: its size
// field holds the overall file size and is followed by a 4 byte form tag.

#[binrw]
#[brw(little)]
#[derive(Debug, Default, Clone, Copy)]
pub struct ChunkHeader {
    pub tag: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    pub fn byte_len() -> u32 {
        8
    }
}

/// Payload of the `fmt ` chunk.
#[binrw]
#[brw(little)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FmtChunk {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FmtChunk {
    pub fn byte_len() -> u32 {
        16
    }

    /// Byte rate implied by the other fields, the declared one must match.
    /// Widened so declared extremes cannot overflow the product.
    pub fn computed_byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.num_channels as u64 * self.bits_per_sample as u64 / 8
    }

    /// Block align implied by the other fields, the declared one must match.
    pub fn computed_block_align(&self) -> u32 {
        self.num_channels as u32 * self.bits_per_sample as u32 / 8
    }
}
