//! Domain model: facts, the planning entity and the solution aggregate.

mod event;
mod event_part;
mod schedule;
mod timeslot;
mod user;
pub mod validation;

pub use event::{Event, PreferredTimeRange};
pub use event_part::{Deadline, EventPart, ImpactSlot};
pub use schedule::{Group, Schedule, ScheduleFacts};
pub use timeslot::Timeslot;
pub use user::{User, WorkTime};
