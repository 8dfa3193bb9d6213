pub mod form;
pub mod model;
pub mod service;
