//! Space Defender game core.
//!
//! A frame-stepped arcade shooter: the player ship slides along the bottom
//! of the playfield and shoots down enemies falling from the top.  This crate
//! holds everything that decides what happens in a frame.  Terminal input
//! and drawing live in the binary.

pub mod collision;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod input;
pub mod render;
pub mod score;
pub mod session;
pub mod spawner;
pub mod store;
