#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod place;
pub mod scene;
pub mod settings;
pub mod spraycan;
