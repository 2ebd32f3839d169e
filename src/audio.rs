//! Sound cues for simulation events
//!
//! The simulation never makes noise itself. Hosts map each [`GameEvent`] to
//! a [`SoundEffect`] and play its [`Tone`]s on whatever synthesizer they
//! have (the browser host uses Web Audio oscillators).

use serde::Serialize;

use crate::sim::GameEvent;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator note, relative to the moment the cue fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    /// Hz
    pub frequency: f32,
    /// Seconds after the cue fires
    pub start: f32,
    /// Seconds
    pub duration: f32,
    pub waveform: Waveform,
    /// Linear gain
    pub volume: f32,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "sound", rename_all = "snake_case")]
pub enum SoundEffect {
    Jump,
    Coin,
    Souvenir,
    /// Pitch climbs with the combo count
    Stomp { combo: u32 },
    Shrink,
    LifeLost,
    /// Flag reached: fanfare followed by the celebration tune
    Flag,
}

/// Victory melody played after the flag fanfare (Hz, seconds)
const CELEBRATION: [(f32, f32); 10] = [
    (523.0, 0.3),
    (659.0, 0.3),
    (784.0, 0.3),
    (698.0, 0.35),
    (880.0, 0.4),
    (988.0, 0.4),
    (880.0, 0.3),
    (784.0, 0.3),
    (659.0, 0.35),
    (523.0, 0.4),
];

/// Stagger between chord voices
const CHORD_STAGGER: f32 = 0.01;

fn beep(frequency: f32, duration: f32, waveform: Waveform, volume: f32) -> Tone {
    Tone {
        frequency,
        start: 0.0,
        duration,
        waveform,
        volume,
    }
}

/// Voices share the volume and start a hair apart; all stop together
fn chord(frequencies: &[f32], duration: f32, waveform: Waveform, volume: f32) -> Vec<Tone> {
    let per_voice = volume / frequencies.len().max(1) as f32;
    frequencies
        .iter()
        .enumerate()
        .map(|(i, &frequency)| {
            let start = i as f32 * CHORD_STAGGER;
            Tone {
                frequency,
                start,
                duration: duration - start,
                waveform,
                volume: per_voice,
            }
        })
        .collect()
}

impl SoundEffect {
    /// The cue for an event, if the event is voiced at all
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jump => Some(SoundEffect::Jump),
            GameEvent::CoinCollected { .. } => Some(SoundEffect::Coin),
            GameEvent::SouvenirCollected { .. } => Some(SoundEffect::Souvenir),
            GameEvent::EnemyStomped { combo, .. } => Some(SoundEffect::Stomp { combo: *combo }),
            GameEvent::PlayerShrunk => Some(SoundEffect::Shrink),
            GameEvent::LifeLost { .. } => Some(SoundEffect::LifeLost),
            GameEvent::FlagReached => Some(SoundEffect::Flag),
            _ => None,
        }
    }

    pub fn tones(self) -> Vec<Tone> {
        match self {
            SoundEffect::Jump => vec![beep(520.0, 0.1, Waveform::Triangle, 0.12)],
            SoundEffect::Coin => vec![beep(860.0, 0.1, Waveform::Sine, 0.16)],
            SoundEffect::Souvenir => chord(&[620.0, 740.0], 0.25, Waveform::Triangle, 0.18),
            SoundEffect::Stomp { combo } => {
                let c = combo as f32;
                chord(
                    &[480.0 + c * 8.0, 620.0 + c * 5.0],
                    0.18,
                    Waveform::Square,
                    0.18,
                )
            }
            SoundEffect::Shrink => chord(&[260.0, 180.0], 0.22, Waveform::Sawtooth, 0.16),
            SoundEffect::LifeLost => chord(&[200.0, 160.0], 0.35, Waveform::Triangle, 0.25),
            SoundEffect::Flag => {
                let mut tones = vec![
                    beep(660.0, 0.3, Waveform::Triangle, 0.2),
                    beep(880.0, 0.4, Waveform::Square, 0.25),
                ];
                let mut at = 0.0;
                for (frequency, duration) in CELEBRATION {
                    tones.push(Tone {
                        start: at,
                        ..beep(frequency, duration, Waveform::Triangle, 0.25)
                    });
                    at += duration;
                }
                tones
            }
        }
    }
}

/// Sound cues for one frame's events, in event order
pub fn cues_for(events: &[GameEvent]) -> Vec<SoundEffect> {
    events.iter().filter_map(SoundEffect::from_event).collect()
}
