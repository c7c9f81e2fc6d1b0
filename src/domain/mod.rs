// Domain layer: core models, pure rules and ports (interfaces).

pub mod model;
pub mod ports;
pub mod secrets;
pub mod ticker;
