use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process::exit,
};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use env_logger::Env;
use log::{error, info};
use wavfile::WaveFile;

#[derive(Parser)]
#[command(version)]
/// Extracts the raw PCM data from WAVE files
pub struct Args {
    /// Paths of the wav files to convert, each is written next to its
    /// input with a .raw extension
    wav_paths: Vec<PathBuf>,
}

/// Replaces the final extension with `raw`, or appends it if there is none.
fn raw_path(input: &Path) -> PathBuf {
    input.with_extension("raw")
}

fn process_file(path: &Path) -> anyhow::Result<()> {
    let mut reader = BufReader::new(
        File::open(path).with_context(|| format!("could not open \"{}\"", path.display()))?,
    );
    let wav = WaveFile::parse_reader(&mut reader)
        .with_context(|| format!("error parsing \"{}\"", path.display()))?;

    let meta = wav.meta();
    info!("Meta data:");
    info!(" - Audio format : {}", meta.audio_format.name());
    info!(" - Channels     : {}", meta.num_channels);
    info!(" - Sample rate  : {}", meta.sample_rate);
    info!(" - Sample size  : {} bits", meta.bits_per_sample);

    let out_path = raw_path(path);
    let mut out = BufWriter::new(
        File::create(&out_path)
            .with_context(|| format!("failed to open output file \"{}\"", out_path.display()))?,
    );
    out.write_all(wav.data())
        .and_then(|()| out.flush())
        .with_context(|| format!("failed to write \"{}\"", out_path.display()))?;
    info!("Wrote \"{}\".", out_path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let env = Env::new().default_filter_or("info");
    env_logger::init_from_env(env);
    let args = Args::parse();

    if args.wav_paths.is_empty() {
        Args::command().print_help()?;
        return Ok(());
    }

    let mut failed = false;
    for path in &args.wav_paths {
        info!("Processing \"{}\"...", path.display());
        if let Err(e) = process_file(path) {
            error!("{e:#}");
            failed = true;
        }
    }
    if failed {
        exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::{env, fs};

    use super::{process_file, raw_path};
    use std::path::{Path, PathBuf};

    #[test]
    pub fn raw_path_replaces_or_appends_extension() {
        assert_eq!(raw_path(Path::new("song.wav")), PathBuf::from("song.raw"));
        assert_eq!(
            raw_path(Path::new("song.take2.wav")),
            PathBuf::from("song.take2.raw")
        );
        assert_eq!(raw_path(Path::new("song")), PathBuf::from("song.raw"));
        assert_eq!(
            raw_path(Path::new("some.dir/song")),
            PathBuf::from("some.dir/song.raw")
        );
    }

    fn valid_wave(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&44100u32.to_le_bytes());
        bytes.extend_from_slice(&176400u32.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    pub fn batch_of_three_with_malformed_middle_file() {
        let dir = env::temp_dir();
        let id = std::process::id();
        let first = dir.join(format!("wav2raw-test-{id}-first.wav"));
        let second = dir.join(format!("wav2raw-test-{id}-second.wav"));
        let third = dir.join(format!("wav2raw-test-{id}-third.wav"));

        let first_payload = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00];
        let third_payload = [0xAA, 0xBB, 0xCC, 0xDD];
        fs::write(&first, valid_wave(&first_payload)).unwrap();
        fs::write(&second, b"XXXXnot a wave file").unwrap();
        fs::write(&third, valid_wave(&third_payload)).unwrap();

        assert!(process_file(&first).is_ok());
        assert!(process_file(&second).is_err());
        assert!(process_file(&third).is_ok());

        assert_eq!(fs::read(raw_path(&first)).unwrap(), first_payload);
        assert_eq!(fs::read(raw_path(&third)).unwrap(), third_payload);
        assert!(!raw_path(&second).exists());

        for path in [&first, &second, &third] {
            fs::remove_file(path).ok();
            fs::remove_file(raw_path(path)).ok();
        }
    }
}
