pub mod registry;
pub mod relay;

pub use registry::{JoinOutcome, LeaveOutcome, Participant, ROOM_CAPACITY, RoomRegistry};
pub use relay::{OutboundFrame, RelayService, ws_handler};
