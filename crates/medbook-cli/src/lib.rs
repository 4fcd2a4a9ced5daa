//! Library side of the `medbook` terminal front end.

pub mod logging;
pub mod render;
pub mod session;
pub mod settings;
