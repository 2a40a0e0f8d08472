//! Decoders en encoders voor het externe state-formaat.

pub mod state_json;
