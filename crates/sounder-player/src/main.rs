//! Sounder player - play sound files and synthesized notes from the
//! command line
//!
//! Resolves the identifier like the engine does: an existing file path,
//! a `<name>.wav` under the configured sounds directory, or a note name
//! like "A#4" synthesized on the fly.
//!
//! ## Usage
//!
//! ```text
//! sounder-player [OPTIONS] <SOUND>
//! sounder-player --make-notes
//! ```
//!
//! ## Options
//!
//! - `--make-notes`: pre-render all 108 notes into the sounds directory
//! - `--loop`: loop the sound until Enter is pressed
//! - `--effect <KIND>`: play through an effect (chorus, compressor,
//!   distortion, echo, flanger, gargle, parameq, reverb)
//! - `--volume <0..1>`, `--pitch <RATIO>`, `--pan <-1..1>`

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use sounder_core::backend::device::DeviceBackend;
use sounder_core::backend::{BackendError, BufferId, PlaybackBackend};
use sounder_core::types::BufferFormat;
use sounder_core::config::{self, EngineConfig};
use sounder_core::engine::{PlayOptions, SoundEngine};
use sounder_core::fx::EffectKind;

struct Options {
    sound: Option<String>,
    make_notes: bool,
    looping: bool,
    effect: Option<EffectKind>,
    volume: Option<f32>,
    pitch: Option<f32>,
    pan: Option<f32>,
}

fn usage() -> &'static str {
    "usage: sounder-player [--loop] [--effect <kind>] \
     [--volume <0..1>] [--pitch <ratio>] [--pan <-1..1>] <sound>\n\
     \x20      sounder-player --make-notes\n\
     <sound> is a WAV file path, a name in the sounds directory, \
     or a note like A#4"
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        sound: None,
        make_notes: false,
        looping: false,
        effect: None,
        volume: None,
        pitch: None,
        pan: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--make-notes" => options.make_notes = true,
            "--loop" => options.looping = true,
            "--effect" => {
                let value = iter.next().context("--effect requires a kind")?;
                options.effect = Some(value.parse()?);
            }
            "--volume" => {
                let value = iter.next().context("--volume requires a value")?;
                options.volume = Some(value.parse().context("--volume must be a number")?);
            }
            "--pitch" => {
                let value = iter.next().context("--pitch requires a value")?;
                options.pitch = Some(value.parse().context("--pitch must be a number")?);
            }
            "--pan" => {
                let value = iter.next().context("--pan requires a value")?;
                options.pan = Some(value.parse().context("--pan must be a number")?);
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{}", usage()),
            sound => {
                if options.sound.replace(sound.to_owned()).is_some() {
                    bail!("only one sound can be given\n{}", usage());
                }
            }
        }
    }

    if options.sound.is_none() && !options.make_notes {
        bail!("{}", usage());
    }
    Ok(options)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let config: EngineConfig = config::load_config(&config::default_config_path());
    log::info!("sounds directory: {}", config.sounds_dir.display());

    if options.make_notes {
        let backend = Arc::new(NullBackend);
        let engine = SoundEngine::new(backend, config.sounds_dir);
        let written = engine.make_notes()?;
        println!("wrote {written} note files to {}", engine.sounds_dir().display());
        return Ok(());
    }

    let sound = options.sound.context("no sound given")?;

    let (backend, _audio) = DeviceBackend::start().context("could not open audio output")?;
    let mut engine = SoundEngine::new(
        Arc::new(backend) as Arc<dyn PlaybackBackend>,
        config.sounds_dir,
    );

    let play_options = PlayOptions {
        looping: options.looping,
        effect: options.effect,
        volume: options.volume.unwrap_or(1.0),
        pitch: options.pitch.unwrap_or(1.0),
        pan: options.pan.unwrap_or(0.0),
    };
    if !engine.play(&sound, play_options) {
        bail!("could not play {sound:?}");
    }

    println!("playing {sound} - press Enter to stop");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    engine.stop(&sound);
    engine.shutdown_all();
    Ok(())
}

/// Backend for file-only operations that never touch the audio device
struct NullBackend;

impl PlaybackBackend for NullBackend {
    fn create_buffer(&self, _format: BufferFormat, _pcm: &[u8]) -> Result<BufferId, BackendError> {
        Err(BackendError::NoDevice)
    }

    fn release_buffer(&self, _id: BufferId) {}

    fn set_position(&self, _id: BufferId, _frame: usize) -> Result<(), BackendError> {
        Ok(())
    }

    fn set_volume(&self, _id: BufferId, _volume: f32) -> Result<(), BackendError> {
        Ok(())
    }

    fn set_pitch(&self, _id: BufferId, _ratio: f32) -> Result<(), BackendError> {
        Ok(())
    }

    fn set_pan(&self, _id: BufferId, _pan: f32) -> Result<(), BackendError> {
        Ok(())
    }

    fn install_effect(&self, _id: BufferId, _kind: EffectKind) -> Result<(), BackendError> {
        Ok(())
    }

    fn set_effect_params(
        &self,
        _id: BufferId,
        _params: &sounder_core::fx::EffectParams,
    ) -> Result<(), BackendError> {
        Ok(())
    }

    fn play(&self, _id: BufferId, _looping: bool) -> Result<(), BackendError> {
        Err(BackendError::NoDevice)
    }

    fn stop(&self, _id: BufferId) -> Result<(), BackendError> {
        Ok(())
    }

    fn is_playing(&self, _id: BufferId) -> bool {
        false
    }
}
