//! Compilation of network parameters into function stages
//!
//! A network becomes three kinds of stages: input normalization, one stage
//! per layer, and output denormalization. [`assemble`] chains them.

pub mod assemble;
pub mod layer;
pub mod normalization;

pub use assemble::assemble;
pub use layer::{compile_layer, layer_stage};
pub use normalization::{NormShape, NormalizationSide};
