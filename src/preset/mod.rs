//! Presets, parts and the batch cursor.
//!
//! A preset is a named import configuration made of ordered parts. Each run
//! of a part is described by a [`PresetPartDefinition`], which advances batch
//! by batch and serializes to [`CommandArguments`] so the next batch can run
//! in a fresh process.

mod arguments;
mod definition;

pub use arguments::CommandArguments;
pub use definition::{PART_NAME_KEY, PRESET_NAME_KEY, PartSettings, PresetPartDefinition};
