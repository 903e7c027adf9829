//! Generation pipeline
//!
//! Turns a [`SyncConfig`] into the state graphs a host would materialize:
//! one bit converter layer and one receive layer, both built on the
//! decision tree.

mod config;
mod layers;

pub use config::{EmoteEntry, SyncConfig, SEND_ANIM_ID};
pub use layers::{
    generate_bit_layer, generate_receive_layer, BitLayer, ReceiveLayer, ReceiveSlot,
};

use tracing::info;

use crate::Result;

/// Every layer produced for one "Generate" action
#[derive(Debug, Clone)]
pub struct Generated {
    /// Encode/decode layer
    pub bit_layer: BitLayer,

    /// Receive layer
    pub receive_layer: ReceiveLayer,
}

/// Run the whole pipeline; any failure discards everything generated so far
pub fn generate(config: &SyncConfig) -> Result<Generated> {
    info!(
        asset_key = %config.asset_key,
        emotes = config.emotes.len(),
        "generating layers"
    );
    Ok(Generated {
        bit_layer: generate_bit_layer(config)?,
        receive_layer: generate_receive_layer(config)?,
    })
}
