#![allow(dead_code, non_snake_case, non_upper_case_globals)]

//! Closed-form simulation of a two-ion light-shift (Mølmer–Sørensen-type)
//! entangling gate mediated by a shared motional mode.

pub mod utils;
pub mod operators;
pub mod hilbert;
pub mod noise;
pub mod dynamics;
pub mod sweep;
