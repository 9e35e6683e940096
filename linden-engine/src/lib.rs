pub mod guests;
pub mod lifecycle;
pub mod mirror;
pub mod rooms;

pub use guests::GuestLedger;
pub use lifecycle::{LifecycleEngine, TransitionReceipt};
pub use mirror::AdminMirror;
pub use rooms::{BulkCreateOutcome, RoomRegistry};
