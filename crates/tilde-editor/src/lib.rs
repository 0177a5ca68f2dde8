//! # tilde-editor — Editor core for tilde
//!
//! This crate holds the editor state and how it is drawn:
//!
//! - **[`cursor`]** — `Cursor` on the screen grid with clamped movement
//! - **[`view`]** — frame composition: tilde rows, welcome banner, cursor
//! - **[`editor`]** — `Editor`, the key dispatch that `tilde-term`'s event loop drives
//! - **[`options`]** — `Options` with defaults and environment overrides

pub mod cursor;
pub mod editor;
pub mod options;
pub mod view;
