//! Nebula Visualizer Core
//!
//! Audio-to-visual mapping pipeline for a circular frequency display:
//! spectral sampling, bass/beat detection, per-bar envelope smoothing, an
//! ambient particle field, and a radial compositor that emits one draw-op
//! list per display frame. The host owns the window, the renderer, and the
//! frame scheduler; this crate owns everything between the audio source and
//! the draw list.

pub mod audio;
pub mod session;
pub mod viz;

pub use session::{FrameScheduler, SessionError, Visualizer};
pub use viz::{DrawOp, Frame, VizConfig};
