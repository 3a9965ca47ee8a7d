//! Orbit Duel Library
//!
//! Simulation core for a two-ship duel around a central sun: gravity, the
//! arena boundary, collisions, ship resources and a scripted opponent.
//!
//! Rendering, audio playback and input devices live outside the crate and plug
//! in through [`game::input::InputSource`], [`game::events::AudioSink`] and
//! [`game::state::FrameSnapshot`].

pub mod config;
pub mod game;
pub mod util;
