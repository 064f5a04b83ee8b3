use crate::registry::Participant;
use dashmap::DashMap;
use tracing::{debug, info};
use vibb_core::{PeerId, RoomId};

/// Hard limit on room membership.
pub const ROOM_CAPACITY: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The participant was admitted. `peers_before` lists the members that
    /// were already present, in join order.
    Admitted { peers_before: Vec<Participant> },
    /// The room already holds two members; nothing was mutated.
    RoomFull,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveOutcome {
    /// The participant that was removed, if it was a member.
    pub removed: Option<Participant>,
    /// The members still in the room after the removal, in join order.
    pub remaining: Vec<Participant>,
}

/// Maps room identifiers to their member sets and enforces the capacity
/// invariant. Rooms are created on first join and released once empty.
///
/// Membership mutations for one room are serialized by the per-entry lock,
/// so two racing joins to a 1-occupant room resolve to exactly one
/// `Admitted`. Operations on different rooms never contend.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Vec<Participant>>,
    memberships: DashMap<PeerId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, room_id: &RoomId, participant: Participant) -> JoinOutcome {
        // A peer sits in at most one room; a stale membership is vacated
        // before the new entry is taken.
        if let Some(previous) = self.room_of(&participant.peer)
            && previous != *room_id
        {
            debug!(
                "Peer {} moves from room '{}' to '{}'",
                participant.peer, previous, room_id
            );
            self.leave(&previous, &participant.peer);
        }

        let mut members = self.rooms.entry(room_id.clone()).or_default();

        if members.iter().any(|m| m.peer == participant.peer) {
            let peers_before = members
                .iter()
                .filter(|m| m.peer != participant.peer)
                .cloned()
                .collect();
            return JoinOutcome::Admitted { peers_before };
        }

        if members.len() >= ROOM_CAPACITY {
            return JoinOutcome::RoomFull;
        }

        let peers_before = members.clone();
        members.push(participant.clone());
        drop(members);

        self.memberships
            .insert(participant.peer.clone(), room_id.clone());
        info!("Room '{}' now has {} member(s)", room_id, peers_before.len() + 1);

        JoinOutcome::Admitted { peers_before }
    }

    /// Removes `peer` from `room_id` and releases the room once empty.
    /// Leaving a room the peer is not in is a no-op.
    pub fn leave(&self, room_id: &RoomId, peer: &PeerId) -> LeaveOutcome {
        let mut outcome = LeaveOutcome::default();

        if let Some(mut members) = self.rooms.get_mut(room_id) {
            if let Some(pos) = members.iter().position(|m| &m.peer == peer) {
                outcome.removed = Some(members.remove(pos));
            }
            outcome.remaining = members.clone();
        }

        if outcome.removed.is_some() {
            self.memberships.remove_if(peer, |_, room| room == room_id);
        }

        if self
            .rooms
            .remove_if(room_id, |_, members| members.is_empty())
            .is_some()
        {
            info!("Room '{}' released", room_id);
        }

        outcome
    }

    /// Members of the room in join order, excluding the querying peer.
    pub fn members_of(&self, room_id: &RoomId, excluding: &PeerId) -> Vec<Participant> {
        self.rooms
            .get(room_id)
            .map(|members| {
                members
                    .iter()
                    .filter(|m| &m.peer != excluding)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn room_of(&self, peer: &PeerId) -> Option<RoomId> {
        self.memberships.get(peer).map(|room| room.clone())
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_member(&self, room_id: &RoomId, peer: &PeerId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|members| members.iter().any(|m| &m.peer == peer))
    }
}
