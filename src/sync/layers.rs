//! Layer generation
//!
//! Bit layer: local int id -> synced flags (encode), synced flags -> int id
//! (decode). Receive layer: `Ready` until any contact flag is set, then the
//! `Dance` machine picks the per-emote entry/loop/exit, then `Done`.

use tracing::{debug, info};

use super::config::{SyncConfig, SEND_ANIM_ID};
use crate::graph::{DriveValue, NodeId, StateGraph};
use crate::param::DecisionParameter;
use crate::tree::{build, RouteTarget, TreeConsumer, TreeLeaf};
use crate::Result;

/// Output of [`generate_bit_layer`]
#[derive(Debug, Clone)]
pub struct BitLayer {
    /// Generated graph
    pub graph: StateGraph,

    /// Machine translating the local id into synced flags
    pub encode: NodeId,

    /// Machine translating received flags back into the id
    pub decode: NodeId,

    /// Encoder leaves, index = id
    pub encode_leaves: Vec<TreeLeaf<NodeId, NodeId>>,

    /// Decoder leaves, index = id
    pub decode_leaves: Vec<TreeLeaf<NodeId, NodeId>>,
}

/// States generated for one id of the receive layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveSlot {
    /// Id selected by the contact flags
    pub id: u32,

    /// Tree leaf; plays the entry clip
    pub entry: NodeId,

    /// Looping state
    pub loop_state: NodeId,

    /// Outro state, left automatically
    pub exit: NodeId,

    /// Index into `SyncConfig::emotes`, `None` for idle ids
    pub emote: Option<usize>,
}

/// Output of [`generate_receive_layer`]
#[derive(Debug, Clone)]
pub struct ReceiveLayer {
    /// Generated graph
    pub graph: StateGraph,

    /// Idle state, left once any flag is set
    pub ready: NodeId,

    /// Machine holding the decision tree
    pub dance: NodeId,

    /// State reached after the dance machine exits
    pub done: NodeId,

    /// One slot per id, index = id
    pub slots: Vec<ReceiveSlot>,
}

impl ReceiveLayer {
    /// Slots bound to an emote
    pub fn bound(&self) -> impl Iterator<Item = &ReceiveSlot> {
        self.slots.iter().filter(|slot| slot.emote.is_some())
    }
}

/// Build the encode/decode machines of the bit converter layer
pub fn generate_bit_layer(config: &SyncConfig) -> Result<BitLayer> {
    let width = config.bit_width()?.get();
    let send_bits = config.send_bit_names()?;

    let mut graph = StateGraph::new("BitConverter").with_write_defaults(config.write_defaults);
    let root = graph.root();
    let encode = graph.add_machine(root, "Local encode")?;
    let decode = graph.add_machine(root, "Remote decode")?;

    let encode_leaves = build(
        &mut graph,
        &encode,
        DecisionParameter::int(SEND_ANIM_ID, width)?,
    )?;
    for leaf in &encode_leaves {
        let id = leaf.param.id();
        graph.rename(leaf.handle, &format!("Send {id}"))?;
        for (name, flag) in send_bits.iter().zip(leaf.param.bits().iter()) {
            graph.add_drive(leaf.handle, name.as_str(), DriveValue::Bool(flag))?;
        }
        graph.add_transition(leaf.handle, None, None)?;
    }

    let decode_leaves = build(
        &mut graph,
        &decode,
        DecisionParameter::bool_group(send_bits.iter().map(String::as_str), width)?,
    )?;
    for leaf in &decode_leaves {
        let id = leaf.param.id();
        graph.rename(leaf.handle, &format!("Receive {id}"))?;
        graph.add_drive(leaf.handle, SEND_ANIM_ID, DriveValue::Int(id))?;
        graph.add_transition(leaf.handle, None, None)?;
    }

    info!(
        bits = width,
        nodes = graph.len(),
        "generated bit converter layer"
    );
    Ok(BitLayer {
        graph,
        encode,
        decode,
        encode_leaves,
        decode_leaves,
    })
}

/// Build the receive layer: `Ready -> Dance -> Done`
///
/// `Ready` is the entry state and moves into `Dance` once any receive flag
/// is set. `Dance` holds the decision tree with one entry/loop/exit triple
/// per id; when it exits the layer passes through `Done` and leaves.
/// Ids `1..=emotes.len()` play the matching emote; id 0 and the unused ids
/// above the emote count get the same states with no clips attached.
pub fn generate_receive_layer(config: &SyncConfig) -> Result<ReceiveLayer> {
    let width = config.bit_width()?.get();
    let recv_bits = config.recv_bit_names()?;
    let param = DecisionParameter::bool_group(recv_bits.iter().map(String::as_str), width)?;

    let mut graph = StateGraph::new("recvLayer").with_write_defaults(config.write_defaults);
    let root = graph.root();
    let ready = graph.add_state(root, "Ready")?;
    let dance = graph.add_machine(root, "Dance")?;
    let done = graph.add_state(root, "Done")?;

    graph.route_default(&root, RouteTarget::Leaf(&ready))?;
    graph.add_transition(ready, Some(dance), Some(param.active_condition()))?;
    graph.add_transition(dance, Some(done), None)?;
    graph.add_transition(done, None, None)?;

    let leaves = build(&mut graph, &dance, param)?;

    let mut slots = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        let id = leaf.param.id();
        graph.rename(leaf.handle, &format!("Entry {id}"))?;
        let loop_state = graph.add_state(leaf.parent, &format!("Loop {id}"))?;
        let exit = graph.add_state(leaf.parent, &format!("Exit {id}"))?;

        graph.add_transition(leaf.handle, Some(loop_state), None)?;
        graph.add_transition(loop_state, Some(exit), Some(leaf.param.exit_condition()))?;
        graph.add_transition(exit, None, None)?;

        let emote = (id as usize)
            .checked_sub(1)
            .filter(|index| *index < config.emotes.len());
        if let Some(index) = emote {
            let item = &config.emotes[index];
            if let Some(clip) = &item.entry {
                graph.set_motion(leaf.handle, clip.as_str())?;
            }
            if let Some(clip) = &item.loop_clip {
                graph.set_motion(loop_state, clip.as_str())?;
            }
            if let Some(clip) = &item.exit {
                graph.set_motion(exit, clip.as_str())?;
            }
            debug!(id, emote = %item.name, "bound emote");
        }

        slots.push(ReceiveSlot {
            id,
            entry: leaf.handle,
            loop_state,
            exit,
            emote,
        });
    }

    info!(
        bits = width,
        emotes = config.emotes.len(),
        slots = slots.len(),
        "generated receive layer"
    );
    Ok(ReceiveLayer {
        graph,
        ready,
        dance,
        done,
        slots,
    })
}
