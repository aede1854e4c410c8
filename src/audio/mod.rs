pub mod alarm;

use alarm::AlarmTone;

use rodio::{OutputStream, Sink};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

/// Audible alert played when a Pomodoro phase ends.
pub trait Chime: Send + Sync {
    fn play(&self);
}

enum AudioCommand {
    Alarm,
    Stop,
}

/// Plays the alarm on a dedicated audio thread; rodio's output stream is not
/// `Send`, so it never leaves that thread.
pub struct AlarmPlayer {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl Default for AlarmPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmPlayer {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("lumen-audio".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Alarm => {
                            if sink.is_none() {
                                match OutputStream::try_default() {
                                    Ok((stream, handle)) => match Sink::try_new(&handle) {
                                        Ok(new_sink) => {
                                            _stream = Some(stream);
                                            sink = Some(new_sink);
                                        }
                                        Err(e) => log::warn!("Failed to create audio sink: {e}"),
                                    },
                                    Err(e) => {
                                        log::warn!("Failed to open audio output stream: {e}")
                                    }
                                }
                            }
                            if let Some(ref s) = sink {
                                s.append(AlarmTone::default());
                                s.play();
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    pub fn stop(&self) {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
    }
}

impl Chime for AlarmPlayer {
    fn play(&self) {
        match self.ensure_thread() {
            Ok(tx) => {
                if let Err(e) = tx.send(AudioCommand::Alarm) {
                    log::warn!("Audio thread is gone: {e}");
                }
            }
            Err(e) => log::warn!("Could not start audio thread: {e}"),
        }
    }
}

/// Counts alerts instead of playing them; for headless hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct SilentChime {
    played: Arc<AtomicUsize>,
}

impl SilentChime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> usize {
        self.played.load(Ordering::SeqCst)
    }
}

impl Chime for SilentChime {
    fn play(&self) {
        self.played.fetch_add(1, Ordering::SeqCst);
    }
}
