//! disksim: solid disks bouncing in a walled box.
//!
//! The physics core (`particle`, `forces`, `integrator`, `collision`,
//! `resolver`, `simulation`) is plain Rust over [`bevy::math::Vec2`] and can be
//! driven without an `App`.  The Bevy front end (`plugin`, `input`,
//! `rendering`, `graphics`) wraps it for interactive use.

pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod forces;
pub mod graphics;
pub mod input;
pub mod integrator;
pub mod particle;
pub mod plugin;
pub mod rendering;
pub mod resolver;
pub mod scenarios;
pub mod simulation;
pub mod spatial_partition;
