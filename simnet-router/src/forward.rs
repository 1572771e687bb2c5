//! Route a packet batch and schedule each output link's queue.

use crate::routing::{DEFAULT_GATEWAY, ForwardingTable};
use crate::scheduler::{Discipline, Packet, schedule};
use tracing::debug;

/// Packets queued on one output link, in transmission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkQueue {
    pub link: String,
    pub packets: Vec<Packet>,
}

/// Route every packet in `batch` by destination, then schedule each link.
///
/// Queues appear in the order their link was first selected. Packets that
/// match no route land on [`DEFAULT_GATEWAY`].
pub fn forward(
    table: &ForwardingTable,
    batch: &[Packet],
    discipline: Discipline,
) -> Vec<LinkQueue> {
    let mut queues: Vec<LinkQueue> = Vec::new();

    for packet in batch {
        let link = table.lookup(packet.destination).unwrap_or(DEFAULT_GATEWAY);
        match queues.iter_mut().find(|q| q.link == link) {
            Some(queue) => queue.packets.push(packet.clone()),
            None => queues.push(LinkQueue {
                link: link.to_string(),
                packets: vec![packet.clone()],
            }),
        }
    }

    for queue in &mut queues {
        queue.packets = schedule(&queue.packets, discipline);
    }

    debug!(
        packets = batch.len(),
        links = queues.len(),
        %discipline,
        "Forwarded batch"
    );
    queues
}
