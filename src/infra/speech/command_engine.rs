use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::watch;

use crate::core::narration::pacing::LONG_PAUSE;
use crate::core::narration::{
    NarrationEvent, NarrationEventSender, SpeechEngine, SpeechError, Utterance, Voice,
};

/// Upper bound for the text handed to one program invocation.
const CHUNK_CHARS: usize = 400;

/// Speaks through an external text-to-speech program such as `espeak-ng`.
///
/// Text is played one chunk per process. Pause and resume take effect between
/// chunks; cancel kills the running process straight away.
pub struct CommandSpeechEngine {
    program: String,
    configured_voices: Vec<Voice>,
    generation: watch::Sender<u64>,
    paused: watch::Sender<bool>,
}

impl CommandSpeechEngine {
    pub fn new(program: impl Into<String>, configured_voices: Vec<Voice>) -> Self {
        let (generation, _) = watch::channel(0);
        let (paused, _) = watch::channel(false);
        Self {
            program: program.into(),
            configured_voices,
            generation,
            paused,
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.send_modify(|g| *g += 1);
        *self.generation.borrow()
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeechEngine {
    async fn voices(&self) -> Vec<Voice> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                let voices = parse_voice_list(&String::from_utf8_lossy(&out.stdout));
                if !voices.is_empty() {
                    return voices;
                }
            }
            Ok(out) => tracing::debug!(status = %out.status, "Voice listing failed"),
            Err(e) => tracing::debug!(program = %self.program, error = %e, "Voice listing failed"),
        }
        self.configured_voices.clone()
    }

    fn speak(&self, utterance: Utterance, events: NarrationEventSender) -> Result<(), SpeechError> {
        if self.program.trim().is_empty() {
            return Err(SpeechError::Unavailable("no speech program configured".to_string()));
        }
        let chunks = chunk_text(&utterance.text, CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SpeechError::EmptyUtterance);
        }

        let generation = self.next_generation();
        self.paused.send_replace(false);

        let job = Playback {
            program: self.program.clone(),
            voice: utterance.voice,
            session: utterance.session,
            chunks,
            generation,
            generation_rx: self.generation.subscribe(),
            paused_rx: self.paused.subscribe(),
            events,
        };
        tokio::spawn(job.run());
        Ok(())
    }

    fn pause(&self) {
        self.paused.send_replace(true);
    }

    fn resume(&self) {
        self.paused.send_replace(false);
    }

    fn cancel(&self) {
        self.next_generation();
        self.paused.send_replace(false);
    }
}

struct Playback {
    program: String,
    voice: Option<String>,
    session: u64,
    chunks: Vec<String>,
    generation: u64,
    generation_rx: watch::Receiver<u64>,
    paused_rx: watch::Receiver<bool>,
    events: NarrationEventSender,
}

impl Playback {
    async fn run(mut self) {
        let chunks = std::mem::take(&mut self.chunks);
        let mut started = false;

        for chunk in chunks {
            if !self.wait_while_paused().await {
                return;
            }

            let mut command = Command::new(&self.program);
            if let Some(voice) = &self.voice {
                command.arg("-v").arg(voice);
            }
            // Text after `--` is never read as an option, even when it starts with `-`.
            command
                .arg("--")
                .arg(&chunk)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true);

            let mut child = match command.spawn() {
                Ok(child) => child,
                Err(e) => {
                    self.report(NarrationEvent::failed(
                        self.session,
                        format!("cannot start {}: {}", self.program, e),
                    ));
                    return;
                }
            };

            if !started {
                started = true;
                self.report(NarrationEvent::started(self.session));
            }

            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => {}
                    Ok(status) => {
                        self.report(NarrationEvent::failed(
                            self.session,
                            format!("{} exited with {}", self.program, status),
                        ));
                        return;
                    }
                    Err(e) => {
                        self.report(NarrationEvent::failed(self.session, e.to_string()));
                        return;
                    }
                },
                _ = superseded(&mut self.generation_rx, self.generation) => {
                    let _ = child.kill().await;
                    tracing::debug!(session = self.session, "Playback cancelled");
                    return;
                }
            }
        }

        self.report(NarrationEvent::finished(self.session));
    }

    /// `false` once this playback has been cancelled.
    async fn wait_while_paused(&mut self) -> bool {
        loop {
            if *self.generation_rx.borrow() != self.generation {
                return false;
            }
            if !*self.paused_rx.borrow() {
                return true;
            }
            tokio::select! {
                changed = self.paused_rx.changed() => if changed.is_err() { return false; },
                changed = self.generation_rx.changed() => if changed.is_err() { return false; },
            }
        }
    }

    fn report(&self, event: NarrationEvent) {
        if *self.generation_rx.borrow() == self.generation {
            let _ = self.events.send(event);
        }
    }
}

async fn superseded(rx: &mut watch::Receiver<u64>, generation: u64) {
    loop {
        if *rx.borrow() != generation {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Split paced text after its long pauses, packing pieces up to `max_chars`.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let separator = format!("{} ", LONG_PAUSE);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in text.split_inclusive(separator.as_str()) {
        if !current.is_empty() && current.len() + piece.len() > max_chars {
            chunks.push(current.trim().to_string());
            current.clear();
        }
        current.push_str(piece);
    }
    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks.retain(|c| !c.is_empty());
    chunks
}

/// Parse `espeak-ng --voices` output: `Pty Language Age/Gender VoiceName File ...`.
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                [_, language, _, name, ..] => Some(Voice {
                    id: language.to_string(),
                    name: name.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Voices named in configuration, used when the program cannot list its own.
pub fn configured_voices(list: &str) -> Vec<Voice> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| Voice {
            id: id.to_string(),
            name: id.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::narration::{NarrationEventKind, NarrationEventReceiver};
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn next_event(rx: &mut NarrationEventReceiver) -> Option<NarrationEvent> {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .ok()
            .flatten()
    }

    fn utterance(session: u64, text: &str) -> Utterance {
        Utterance {
            session,
            text: text.to_string(),
            voice: None,
        }
    }

    #[test]
    fn test_chunk_text_splits_after_long_pauses() {
        let text = "First sentence. ... Second one! ... Third.";
        assert_eq!(chunk_text(text, 1000), vec![text.to_string()]);
        assert_eq!(
            chunk_text(text, 20),
            vec!["First sentence. ...", "Second one! ...", "Third."]
        );
        assert!(chunk_text("   ", 20).is_empty());
    }

    #[test]
    fn test_parse_voice_list() {
        let output = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                      5  af              --/M      Afrikaans          gmw/af\n \
                      2  en-gb           --/M      English_(Great_Britain) gmw/en  (en 2)\n\n";
        let voices = parse_voice_list(output);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].id, "en-gb");
        assert_eq!(voices[1].name, "English_(Great_Britain)");
    }

    #[test]
    fn test_configured_voices() {
        let voices = configured_voices("en-us, de,,");
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].id, "en-us");
        assert_eq!(voices[1].name, "de");
    }

    #[tokio::test]
    async fn test_voice_listing_falls_back_to_configuration() {
        let engine =
            CommandSpeechEngine::new("definitely-not-a-tts-program", configured_voices("en-us"));
        assert_eq!(engine.voices().await, configured_voices("en-us"));
    }

    #[tokio::test]
    async fn test_empty_utterance_rejected() {
        let engine = CommandSpeechEngine::new("true", Vec::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(matches!(
            engine.speak(utterance(1, "  "), tx),
            Err(SpeechError::EmptyUtterance)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_playback_reports_start_and_finish() {
        let engine = CommandSpeechEngine::new("true", Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        engine.speak(utterance(7, "Hello. ... World."), tx).unwrap();

        assert_eq!(next_event(&mut rx).await, Some(NarrationEvent::started(7)));
        assert_eq!(next_event(&mut rx).await, Some(NarrationEvent::finished(7)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_text_starting_with_dash_is_spoken_verbatim() {
        // `basename` rejects unknown options, so a bullet line would fail without `--`.
        let engine = CommandSpeechEngine::new("basename", Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        engine
            .speak(utterance(5, "- Call the bank today. ... -v is not a voice."), tx)
            .unwrap();

        assert_eq!(next_event(&mut rx).await, Some(NarrationEvent::started(5)));
        assert_eq!(next_event(&mut rx).await, Some(NarrationEvent::finished(5)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_reports_failure() {
        let engine = CommandSpeechEngine::new("false", Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        engine.speak(utterance(3, "Hello."), tx).unwrap();

        assert_eq!(next_event(&mut rx).await, Some(NarrationEvent::started(3)));
        let failed = next_event(&mut rx).await.unwrap();
        assert!(matches!(failed.kind, NarrationEventKind::Failed(_)));
    }

    #[tokio::test]
    async fn test_missing_program_reports_failure() {
        let engine = CommandSpeechEngine::new("definitely-not-a-tts-program", Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        engine.speak(utterance(4, "Hello."), tx).unwrap();

        let event = next_event(&mut rx).await.unwrap();
        assert_eq!(event.session, 4);
        assert!(matches!(event.kind, NarrationEventKind::Failed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_silences_playback() {
        // `sleep 5` stands in for a long utterance.
        let engine = CommandSpeechEngine::new("sleep", Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        engine.speak(utterance(9, "5"), tx).unwrap();
        assert_eq!(next_event(&mut rx).await, Some(NarrationEvent::started(9)));

        engine.cancel();
        let after_cancel = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(after_cancel.is_err() || after_cancel.unwrap().is_none());
    }
}
