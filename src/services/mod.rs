pub mod client;
pub mod controller;
pub mod history;
pub mod renderer;
