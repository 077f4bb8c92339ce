//! Timetable state: the solution the search mutates.

mod state;
mod text;

pub use state::{Timetable, Violations};
