//! Shared pieces of the interactive consoles: slash commands, stdin input,
//! and timeline rendering.

pub mod commands;
pub mod input;
pub mod render;
