pub mod availability;
pub mod page;
