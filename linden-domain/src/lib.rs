pub mod admin;
pub mod booking;
pub mod guest;
pub mod room;

pub use admin::{AdminAggregate, GuestFilters, GuestSnapshot, GuestView};
pub use booking::{Booking, BookingStatus, TransitionAction};
pub use guest::{Guest, Profile};
pub use room::{NewRoom, Room, RoomStatus, RoomType};
