pub mod reservation;
pub mod room;
pub mod room_restriction;
pub mod user;

pub use reservation as reservations;
pub use room as rooms;
pub use room_restriction as room_restrictions;
pub use user as users;
