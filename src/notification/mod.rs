pub mod controller;
pub mod hub;
pub mod index;
pub mod model;
pub mod session;
