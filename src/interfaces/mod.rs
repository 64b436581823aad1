//! Outer surfaces that feed commands into the application layer.

pub mod csv;
