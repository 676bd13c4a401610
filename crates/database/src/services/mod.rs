pub mod availability;
pub mod reservation;
pub mod restriction;
pub mod room;
pub mod user;

pub use availability::AvailabilityService;
pub use reservation::{GuestDetails, NewReservation, ReservationService, ReservationWithRoom};
pub use restriction::RestrictionService;
pub use room::RoomService;
pub use user::UserService;
