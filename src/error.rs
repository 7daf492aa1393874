//! Error types
//!
//! Nothing in the frame loop is fatal. Combat errors describe why an
//! interaction was skipped; `tick` logs them at trace level and moves on.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::state::PlayerSlot;

/// Recoverable anomalies inside a combat frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// Overlap gradient vanished (nested or symmetric masks)
    #[error("contact normal is degenerate (zero overlap gradient)")]
    DegenerateNormal,
    /// Ability requested without enough energy
    #[error("ability needs {cost} energy, {available} available")]
    InsufficientResource { cost: f64, available: f64 },
    /// Ability requested before its cooldown elapsed
    #[error("ability cooling down ({remaining_ms:.1} ms left)")]
    CoolingDown { remaining_ms: f64 },
    /// Input addressed to a ship that is not on the roster
    #[error("no ship on the roster for {slot:?}")]
    OrphanedInput { slot: PlayerSlot },
}

/// Mask whose pixel data does not match its declared size
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mask is {width}x{height} but carries {len} pixels")]
pub struct MaskSizeError {
    pub width: u32,
    pub height: u32,
    pub len: usize,
}

/// Settings loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON")]
    Parse(#[from] serde_json::Error),
}
