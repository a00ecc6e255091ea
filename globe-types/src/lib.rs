extern crate nalgebra as na;

pub mod body;
pub mod layout;
pub mod orbit;
pub mod prelude;
pub mod time;
pub mod tle;
