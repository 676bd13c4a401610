pub mod calendar;
pub mod date_range;
pub mod forms;
pub mod mail;
pub mod restriction_kind;
pub mod source;
