//! The sound engine: named buffer cache, playback control and effect
//! wiring on top of a [`PlaybackBackend`]
//!
//! Sounds are addressed by an identifier that is resolved in order: an
//! existing file path, a `<name>.wav` file under the configured sounds
//! directory, and finally a note name (like "A#4") synthesized in
//! memory. Each identifier maps to at most one device buffer; repeated
//! plays reuse the cached buffer.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::backend::{BackendError, PlaybackBackend, SoundBuffer};
use crate::fx::{EffectKind, EffectStore};
use crate::synth::{self, NoteSpec};
use crate::wav::{self, WavError};

/// Errors from loading, decoding or device-side operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The identifier is neither a readable file nor a valid note name
    #[error(transparent)]
    Note(#[from] synth::InvalidNote),

    /// The sound file is not a WAV this engine understands
    #[error(transparent)]
    Wav(#[from] WavError),

    /// Reading a sound file failed
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a generated sound file failed
    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The playback backend rejected an operation
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A cached sound: the device buffer plus which effect kind (if any)
/// is currently installed on it
struct SoundBufferEntry {
    handle: SoundBuffer,
    current_effect: Option<EffectKind>,
}

/// How to play a sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    pub looping: bool,
    /// Effect to run the sound through; `None` plays it dry
    pub effect: Option<EffectKind>,
    /// Linear gain, 0.0-1.0
    pub volume: f32,
    /// Playback-rate ratio, 1.0 = original pitch
    pub pitch: f32,
    /// Stereo pan, -1.0 (left) to 1.0 (right)
    pub pan: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            looping: false,
            effect: None,
            volume: 1.0,
            pitch: 1.0,
            pan: 0.0,
        }
    }
}

/// Top-level engine owning the buffer cache and effect parameters
pub struct SoundEngine {
    backend: Arc<dyn PlaybackBackend>,
    sounds_dir: PathBuf,
    buffers: HashMap<String, SoundBufferEntry>,
    effects: EffectStore,
}

impl SoundEngine {
    pub fn new(backend: Arc<dyn PlaybackBackend>, sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            sounds_dir: sounds_dir.into(),
            buffers: HashMap::new(),
            effects: EffectStore::new(),
        }
    }

    /// Directory searched for `<name>.wav` files
    pub fn sounds_dir(&self) -> &Path {
        &self.sounds_dir
    }

    /// Global effect parameter store, one record per effect kind
    pub fn effects(&self) -> &EffectStore {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectStore {
        &mut self.effects
    }

    /// Whether a device buffer is cached under this identifier
    pub fn is_cached(&self, name: &str) -> bool {
        self.buffers.contains_key(name)
    }

    /// Direct handle to a cached buffer for position/volume/pitch/pan
    /// control; `None` until the sound has been played at least once
    pub fn buffer(&self, name: &str) -> Option<&SoundBuffer> {
        self.buffers.get(name).map(|entry| &entry.handle)
    }

    /// Resolve an identifier to WAV bytes: file path, sounds-dir file,
    /// or in-memory note synthesis, in that order
    fn load_or_synth(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        let direct = Path::new(name);
        let path = if direct.is_file() {
            Some(direct.to_path_buf())
        } else {
            let candidate = self.sounds_dir.join(format!("{name}.wav"));
            candidate.is_file().then_some(candidate)
        };

        match path {
            Some(path) => {
                debug!("loading {name:?} from {}", path.display());
                fs::read(&path).map_err(|source| EngineError::FileRead { path, source })
            }
            None => {
                let note: NoteSpec = name.parse()?;
                debug!("no file for {name:?}, synthesizing {note}");
                Ok(synth::note_wav(note))
            }
        }
    }

    /// Get the cached entry for an identifier, creating and uploading
    /// the device buffer on first use
    fn ensure(&mut self, name: &str) -> Result<&mut SoundBufferEntry, EngineError> {
        if !self.buffers.contains_key(name) {
            let bytes = self.load_or_synth(name)?;
            let (header, pcm) = wav::parse(&bytes)?;
            let id = self.backend.create_buffer(header.format(), &pcm)?;
            info!("cached {name:?} as buffer {id} ({} PCM bytes)", pcm.len());
            self.buffers.insert(
                name.to_owned(),
                SoundBufferEntry {
                    handle: SoundBuffer::new(Arc::clone(&self.backend), id),
                    current_effect: None,
                },
            );
        }
        // The branch above either found or just inserted the entry
        Ok(self.buffers.get_mut(name).expect("entry just ensured"))
    }

    /// Play a sound from the beginning
    ///
    /// Loads and caches the sound on first use, then rewinds, applies
    /// volume/pitch/pan and the requested effect, and starts playback.
    /// Returns `false` (after logging) when the sound cannot be
    /// resolved, decoded or started; a failure to push effect
    /// parameters onto an already installed effect only logs a warning
    /// and still counts as success.
    pub fn play(&mut self, name: &str, options: PlayOptions) -> bool {
        match self.play_inner(name, options) {
            Ok(()) => true,
            Err(err) => {
                error!("failed to play {name:?}: {err}");
                false
            }
        }
    }

    fn play_inner(&mut self, name: &str, options: PlayOptions) -> Result<(), EngineError> {
        // Snapshot the parameters before `ensure` borrows the cache
        let params = options.effect.map(|kind| self.effects.params_for(kind));
        let entry = self.ensure(name)?;

        entry.handle.set_position(0)?;
        entry.handle.set_volume(options.volume)?;
        entry.handle.set_pitch(options.pitch)?;
        entry.handle.set_pan(options.pan)?;

        if let (Some(kind), Some(params)) = (options.effect, params) {
            if entry.current_effect != Some(kind) {
                entry.handle.install_effect(kind)?;
                entry.current_effect = Some(kind);
            }
            if let Err(err) = entry.handle.set_effect_params(&params) {
                warn!("could not push {kind} parameters onto {name:?}: {err}");
            }
        }

        entry.handle.play(options.looping)?;
        Ok(())
    }

    /// Stop a playing sound, keeping its buffer cached
    ///
    /// Returns `false` when the sound is unknown or not playing.
    pub fn stop(&mut self, name: &str) -> bool {
        let Some(entry) = self.buffers.get(name) else {
            return false;
        };
        if !entry.handle.is_playing() {
            return false;
        }
        match entry.handle.stop() {
            Ok(()) => true,
            Err(err) => {
                error!("failed to stop {name:?}: {err}");
                false
            }
        }
    }

    /// Whether the sound is currently playing
    pub fn is_playing(&self, name: &str) -> bool {
        self.buffers
            .get(name)
            .is_some_and(|entry| entry.handle.is_playing())
    }

    /// Pre-render every note as a WAV file under the sounds directory
    ///
    /// Writes all 108 notes (12 pitch classes, octaves 0-8), skipping
    /// files that already exist. Returns the number written.
    pub fn make_notes(&self) -> Result<usize, EngineError> {
        fs::create_dir_all(&self.sounds_dir).map_err(|source| EngineError::FileWrite {
            path: self.sounds_dir.clone(),
            source,
        })?;

        let mut written = 0;
        for pitch_class in synth::PITCH_CLASSES {
            for octave in 0..=synth::MAX_OCTAVE {
                let name = format!("{pitch_class}{octave}");
                let path = self.sounds_dir.join(format!("{name}.wav"));
                if path.exists() {
                    continue;
                }
                let note: NoteSpec = name.parse()?;
                fs::write(&path, synth::note_wav(note))
                    .map_err(|source| EngineError::FileWrite { path: path.clone(), source })?;
                written += 1;
            }
        }

        info!("wrote {written} note files to {}", self.sounds_dir.display());
        Ok(written)
    }

    /// Drop every cached buffer, releasing its device resources
    pub fn shutdown_all(&mut self) {
        let count = self.buffers.len();
        self.buffers.clear();
        if count > 0 {
            info!("released {count} cached buffers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BufferId;
    use crate::fx::{ChorusParams, EffectParams};
    use crate::types::BufferFormat;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockState {
        created: usize,
        released: usize,
        installs: Vec<(u64, EffectKind)>,
        param_pushes: Vec<(u64, EffectParams)>,
        positions: Vec<usize>,
        volumes: Vec<f32>,
        pitches: Vec<f32>,
        pans: Vec<f32>,
        playing: HashSet<u64>,
        fail_create: bool,
        fail_params: bool,
        last_format: Option<BufferFormat>,
        last_pcm_len: usize,
    }

    #[derive(Default)]
    struct MockBackend {
        state: Mutex<MockState>,
        next_id: AtomicU64,
    }

    impl MockBackend {
        fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.state.lock().unwrap()
        }
    }

    impl PlaybackBackend for MockBackend {
        fn create_buffer(
            &self,
            format: BufferFormat,
            pcm: &[u8],
        ) -> Result<BufferId, BackendError> {
            let mut state = self.state();
            if state.fail_create {
                return Err(BackendError::NoDevice);
            }
            state.created += 1;
            state.last_format = Some(format);
            state.last_pcm_len = pcm.len();
            Ok(BufferId(self.next_id.fetch_add(1, Ordering::SeqCst)))
        }

        fn release_buffer(&self, _id: BufferId) {
            self.state().released += 1;
        }

        fn set_position(&self, _id: BufferId, frame: usize) -> Result<(), BackendError> {
            self.state().positions.push(frame);
            Ok(())
        }

        fn set_volume(&self, _id: BufferId, volume: f32) -> Result<(), BackendError> {
            self.state().volumes.push(volume);
            Ok(())
        }

        fn set_pitch(&self, _id: BufferId, ratio: f32) -> Result<(), BackendError> {
            self.state().pitches.push(ratio);
            Ok(())
        }

        fn set_pan(&self, _id: BufferId, pan: f32) -> Result<(), BackendError> {
            self.state().pans.push(pan);
            Ok(())
        }

        fn install_effect(&self, id: BufferId, kind: EffectKind) -> Result<(), BackendError> {
            self.state().installs.push((id.0, kind));
            Ok(())
        }

        fn set_effect_params(
            &self,
            id: BufferId,
            params: &EffectParams,
        ) -> Result<(), BackendError> {
            let mut state = self.state();
            if state.fail_params {
                return Err(BackendError::EffectMismatch(params.kind(), id));
            }
            state.param_pushes.push((id.0, *params));
            Ok(())
        }

        fn play(&self, id: BufferId, _looping: bool) -> Result<(), BackendError> {
            self.state().playing.insert(id.0);
            Ok(())
        }

        fn stop(&self, id: BufferId) -> Result<(), BackendError> {
            self.state().playing.remove(&id.0);
            Ok(())
        }

        fn is_playing(&self, id: BufferId) -> bool {
            self.state().playing.contains(&id.0)
        }
    }

    fn engine_with_mock(sounds_dir: &Path) -> (SoundEngine, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::default());
        let engine = SoundEngine::new(
            Arc::clone(&backend) as Arc<dyn PlaybackBackend>,
            sounds_dir,
        );
        (engine, backend)
    }

    fn effected(kind: EffectKind) -> PlayOptions {
        PlayOptions {
            effect: Some(kind),
            ..PlayOptions::default()
        }
    }

    #[test]
    fn test_play_caches_one_buffer_per_name() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        assert!(engine.play("A4", PlayOptions::default()));
        let first_id = engine.buffer("A4").map(|b| b.id());
        assert!(engine.play("A4", PlayOptions::default()));
        assert_eq!(backend.state().created, 1);
        assert!(engine.is_cached("A4"));
        assert_eq!(engine.buffer("A4").map(|b| b.id()), first_id);
    }

    #[test]
    fn test_note_synthesis_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        assert!(engine.play("C#3", PlayOptions::default()));
        let state = backend.state();
        // One second of 16-bit stereo at 44.1 kHz
        assert_eq!(state.last_pcm_len, 176400);
        assert_eq!(state.last_format, Some(BufferFormat::default()));
    }

    #[test]
    fn test_unresolvable_name_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        assert!(!engine.play("not-a-note", PlayOptions::default()));
        assert!(!engine.is_cached("not-a-note"));
        assert_eq!(backend.state().created, 0);
    }

    #[test]
    fn test_sounds_dir_file_preferred_over_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        // A deliberately short "A4.wav" that cannot be one second long
        let pcm = vec![0u8; 400];
        std::fs::write(dir.path().join("A4.wav"), wav::build(&pcm, BufferFormat::default()))
            .unwrap();

        let (mut engine, backend) = engine_with_mock(dir.path());
        assert!(engine.play("A4", PlayOptions::default()));
        assert_eq!(backend.state().last_pcm_len, 400);
    }

    #[test]
    fn test_direct_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(&path, wav::build(&[0u8; 64], BufferFormat::default())).unwrap();

        let (mut engine, backend) = engine_with_mock(dir.path());
        assert!(engine.play(path.to_str().unwrap(), PlayOptions::default()));
        assert_eq!(backend.state().last_pcm_len, 64);
    }

    #[test]
    fn test_corrupt_file_fails_without_caching() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A4.wav"), b"not a wav at all").unwrap();

        let (mut engine, backend) = engine_with_mock(dir.path());
        assert!(!engine.play("A4", PlayOptions::default()));
        assert!(!engine.is_cached("A4"));
        assert_eq!(backend.state().created, 0);
    }

    #[test]
    fn test_create_failure_then_retry() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        backend.state().fail_create = true;
        assert!(!engine.play("A4", PlayOptions::default()));
        assert!(!engine.is_cached("A4"));

        backend.state().fail_create = false;
        assert!(engine.play("A4", PlayOptions::default()));
        assert_eq!(backend.state().created, 1);
    }

    #[test]
    fn test_play_rewinds_and_applies_controls() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        let options = PlayOptions {
            volume: 0.5,
            pitch: 2.0,
            pan: -0.25,
            ..PlayOptions::default()
        };
        assert!(engine.play("A4", options));

        let state = backend.state();
        assert_eq!(state.positions, vec![0]);
        assert_eq!(state.volumes, vec![0.5]);
        assert_eq!(state.pitches, vec![2.0]);
        assert_eq!(state.pans, vec![-0.25]);
    }

    #[test]
    fn test_stop_and_is_playing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _backend) = engine_with_mock(dir.path());

        assert!(!engine.is_playing("A4"));
        assert!(engine.play("A4", PlayOptions::default()));
        assert!(engine.is_playing("A4"));

        assert!(engine.stop("A4"));
        assert!(!engine.is_playing("A4"));
        // Already stopped, and never-loaded names both report false
        assert!(!engine.stop("A4"));
        assert!(!engine.stop("B2"));
    }

    #[test]
    fn test_effect_installed_once_params_pushed_each_play() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        assert!(engine.play("A4", effected(EffectKind::Chorus)));
        assert!(engine.play("A4", effected(EffectKind::Chorus)));

        let state = backend.state();
        assert_eq!(state.installs.len(), 1);
        assert_eq!(state.installs[0].1, EffectKind::Chorus);
        assert_eq!(state.param_pushes.len(), 2);
    }

    #[test]
    fn test_effect_change_reinstalls() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        assert!(engine.play("A4", effected(EffectKind::Chorus)));
        assert!(engine.play("A4", effected(EffectKind::Reverb)));

        let kinds: Vec<EffectKind> = backend.state().installs.iter().map(|(_, k)| *k).collect();
        assert_eq!(kinds, vec![EffectKind::Chorus, EffectKind::Reverb]);
    }

    #[test]
    fn test_updated_params_reach_backend() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        let custom = ChorusParams {
            wet_dry_mix: 80.0,
            ..ChorusParams::default()
        };
        engine.effects_mut().set_chorus(custom);
        assert!(engine.play("A4", effected(EffectKind::Chorus)));

        let state = backend.state();
        match state.param_pushes[0].1 {
            EffectParams::Chorus(params) => assert_eq!(params.wet_dry_mix, 80.0),
            ref other => panic!("expected chorus params, got {other:?}"),
        }
    }

    #[test]
    fn test_param_push_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        backend.state().fail_params = true;
        assert!(engine.play("A4", effected(EffectKind::Echo)));
        assert!(engine.is_playing("A4"));
    }

    #[test]
    fn test_make_notes_writes_all_then_none() {
        let dir = tempfile::tempdir().unwrap();
        let sounds = dir.path().join("sounds");
        let (engine, _backend) = engine_with_mock(&sounds);

        assert_eq!(engine.make_notes().unwrap(), 108);
        assert_eq!(engine.make_notes().unwrap(), 0);

        let bytes = std::fs::read(sounds.join("G#8.wav")).unwrap();
        let (header, pcm) = wav::parse(&bytes).unwrap();
        assert_eq!(header.format(), BufferFormat::default());
        assert_eq!(pcm.len(), 176400);
    }

    #[test]
    fn test_shutdown_releases_buffers() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, backend) = engine_with_mock(dir.path());

        assert!(engine.play("A4", PlayOptions::default()));
        assert!(engine.play("B2", PlayOptions::default()));
        engine.shutdown_all();

        let state = backend.state();
        assert_eq!(state.created, 2);
        assert_eq!(state.released, 2);
        assert!(!engine.is_cached("A4"));
    }
}
