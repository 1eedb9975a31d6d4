pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod state;
pub mod web_io;
