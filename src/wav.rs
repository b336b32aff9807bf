use std::io::{self, Read, Seek, SeekFrom};

use binrw::BinReaderExt;

use crate::structs::{ChunkHeader, FmtChunk};

pub const WAVE_FORMAT_PCM: u16 = 1;
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Pcm,
    IeeeFloat,
    /// Unrecognized format code, preserved as declared in the file.
    Unknown(u16),
}

impl AudioFormat {
    pub fn from_code(code: u16) -> Self {
        match code {
            WAVE_FORMAT_PCM => AudioFormat::Pcm,
            WAVE_FORMAT_IEEE_FLOAT => AudioFormat::IeeeFloat,
            other => AudioFormat::Unknown(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            AudioFormat::Pcm => WAVE_FORMAT_PCM,
            AudioFormat::IeeeFloat => WAVE_FORMAT_IEEE_FLOAT,
            AudioFormat::Unknown(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AudioFormat::Pcm => "PCM",
            AudioFormat::IeeeFloat => "IEEE float",
            AudioFormat::Unknown(_) => "Unknown",
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    #[error("Not a valid WAVE file")]
    NotWaveFormat,
    #[error("Missing RIFF chunk")]
    MissingRiffChunk,
    #[error("Missing fmt chunk")]
    MissingFmtChunk,
    #[error("Missing data chunk")]
    MissingDataChunk,
    #[error("Invalid number of bits per sample: {0}")]
    InvalidBitsPerSample(u16),
    #[error("Invalid byte rate: declared {declared}, computed {computed}")]
    InvalidByteRate { declared: u32, computed: u64 },
    #[error("Invalid block align: declared {declared}, computed {computed}")]
    InvalidBlockAlign { declared: u16, computed: u32 },
    #[error("Stream ended in the middle of a declared field or payload")]
    TruncatedRead,
    #[error("Error reading stream")]
    Io(#[source] io::Error),
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ParseError::TruncatedRead
        } else {
            ParseError::Io(err)
        }
    }
}

impl From<binrw::Error> for ParseError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(io_err) => io_err.into(),
            // the derive wraps field-level errors in a backtrace, classify
            // the root error
            binrw::Error::Backtrace(bt) => (*bt.error).into(),
            other => ParseError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                other.to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WaveMeta {
    pub audio_format: AudioFormat,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

/// A parsed WAVE file: format metadata plus the raw bytes of its `data`
/// chunk. Constructing one succeeds only if the whole file validates, so an
/// instance always holds a non-empty payload.
#[derive(Debug)]
pub struct WaveFile {
    meta: WaveMeta,
    data: Vec<u8>,
}

impl WaveFile {
    /// Walks the RIFF chunks of `f` until the `data` chunk is found.
    ///
    /// Unknown chunks are skipped over using their declared size. Anything
    /// after the `data` chunk is ignored. Fails if the RIFF, `fmt ` or `data`
    /// chunk is missing, if the `fmt ` fields are inconsistent, or if the
    /// stream ends before a declared field or payload could be read.
    pub fn parse_reader<RS: Read + Seek>(f: &mut RS) -> Result<Self, ParseError> {
        let end = f.seek(SeekFrom::End(0))?;
        f.seek(SeekFrom::Start(0))?;

        let mut riff_seen = false;
        let mut fmt: Option<FmtChunk> = None;
        let mut data: Option<Vec<u8>> = None;

        while f.stream_position()? < end {
            let header: ChunkHeader = f.read_le()?;
            match &header.tag {
                b"RIFF" => {
                    // the size field holds the overall file size, unused
                    let form: [u8; 4] = f.read_le()?;
                    if &form != b"WAVE" {
                        return Err(ParseError::NotWaveFormat);
                    }
                    riff_seen = true;
                }
                b"fmt " => {
                    let chunk: FmtChunk = f.read_le()?;
                    if chunk.bits_per_sample % 2 != 0 {
                        return Err(ParseError::InvalidBitsPerSample(chunk.bits_per_sample));
                    }
                    let computed = chunk.computed_byte_rate();
                    if u64::from(chunk.byte_rate) != computed {
                        return Err(ParseError::InvalidByteRate {
                            declared: chunk.byte_rate,
                            computed,
                        });
                    }
                    let computed = chunk.computed_block_align();
                    if u32::from(chunk.block_align) != computed {
                        return Err(ParseError::InvalidBlockAlign {
                            declared: chunk.block_align,
                            computed,
                        });
                    }
                    fmt = Some(chunk);
                }
                b"data" => {
                    let mut payload = vec![0; header.size as usize];
                    f.read_exact(&mut payload)?;
                    data = Some(payload);
                    // the first data chunk ends the walk, trailing chunks
                    // are ignored
                    break;
                }
                _ => {
                    f.seek(SeekFrom::Current(header.size.into()))?;
                }
            }
        }

        if !riff_seen {
            return Err(ParseError::MissingRiffChunk);
        }
        let fmt = fmt.ok_or(ParseError::MissingFmtChunk)?;
        let data = match data {
            Some(payload) if !payload.is_empty() => payload,
            _ => return Err(ParseError::MissingDataChunk),
        };

        Ok(WaveFile {
            meta: WaveMeta {
                audio_format: AudioFormat::from_code(fmt.audio_format),
                num_channels: fmt.num_channels,
                sample_rate: fmt.sample_rate,
                bits_per_sample: fmt.bits_per_sample,
            },
            data,
        })
    }

    pub fn meta(&self) -> &WaveMeta {
        &self.meta
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Consumes the file, moving the payload out without copying it.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
