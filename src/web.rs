//! Browser host glue
//!
//! The page owns the canvas and the `requestAnimationFrame` loop. Each frame
//! it forwards key state, calls [`WebGame::update`] with the elapsed time,
//! and draws from [`WebGame::snapshot`]. Sound cues are played here on Web
//! Audio oscillators.

use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::audio::{SoundEffect, Tone, Waveform};
use crate::consts::{MAX_SUBSTEPS, SIM_HZ};
use crate::sim::{GameEvent, GameState, LevelCatalog, TickInput, tick};
use crate::tuning::Tuning;

/// Longest frame gap we try to catch up on (tab switches etc.)
const MAX_FRAME_MS: f64 = 100.0;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // A logger is already installed (hot reload)
        return;
    }
    log::info!("Harbor Bros starting...");
}

/// Web Audio output for sound cues
struct AudioPlayer {
    ctx: Option<AudioContext>,
    muted: bool,
}

impl AudioPlayer {
    fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx, muted: false }
    }

    fn play(&self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        for tone in effect.tones() {
            play_tone(ctx, &tone);
        }
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Triangle => OscillatorType::Triangle,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    }
}

fn create_osc(
    ctx: &AudioContext,
    freq: f32,
    osc_type: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(osc_type);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    Some((osc, gain))
}

fn play_tone(ctx: &AudioContext, tone: &Tone) {
    let Some((osc, gain)) = create_osc(ctx, tone.frequency, oscillator_type(tone.waveform)) else {
        return;
    };
    let t = ctx.current_time() + f64::from(tone.start);
    gain.gain().set_value(tone.volume);
    osc.start_with_when(t).ok();
    osc.stop_with_when(t + f64::from(tone.duration)).ok();
}

/// One game session, driven by the page
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    input: TickInput,
    accumulator: f64,
    audio: AudioPlayer,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64) -> Result<WebGame, JsValue> {
        let catalog = LevelCatalog::builtin().map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            state: GameState::new(catalog, Tuning::default(), seed as u64),
            input: TickInput::default(),
            accumulator: 0.0,
            audio: AudioPlayer::new(),
        })
    }

    /// Replace the balance sheet with a JSON tuning document
    pub fn load_tuning(&mut self, json: &str) -> Result<(), JsValue> {
        let tuning = Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.state.tuning = tuning;
        log::info!("Tuning loaded");
        Ok(())
    }

    /// Forward a `KeyboardEvent.code`. Returns true if the key is bound.
    pub fn set_key(&mut self, code: &str, down: bool) -> bool {
        match code {
            "ArrowLeft" | "KeyA" => self.input.left = down,
            "ArrowRight" | "KeyD" => self.input.right = down,
            "ArrowUp" | "KeyW" | "Space" => self.input.jump = down,
            // One-shot keys latch on press and clear after the next tick
            "Enter" => self.input.start |= down,
            "KeyP" | "Escape" => self.input.pause |= down,
            _ => return false,
        }
        true
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.input.autopilot = on;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.muted = muted;
    }

    /// Level-select hotkey: jump straight into a level, keeping the run
    pub fn select_level(&mut self, index: usize) {
        self.state.start_level(index, false);
    }

    /// Advance by the elapsed wall time; returns the number of ticks run
    pub fn update(&mut self, elapsed_ms: f64) -> u32 {
        let step_ms = 1000.0 / SIM_HZ;
        self.accumulator += elapsed_ms.min(MAX_FRAME_MS);

        let mut substeps = 0;
        while self.accumulator >= step_ms && substeps < MAX_SUBSTEPS {
            let events = tick(&mut self.state, &self.input);
            self.accumulator -= step_ms;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.start = false;
            self.input.pause = false;

            self.play_cues(&events);
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Full render state as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.state
            .snapshot_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn score(&self) -> f64 {
        self.state.score as f64
    }

    pub fn lives(&self) -> u8 {
        self.state.lives
    }
}

impl WebGame {
    fn play_cues(&self, events: &[GameEvent]) {
        for effect in crate::audio::cues_for(events) {
            self.audio.play(effect);
        }
    }
}
