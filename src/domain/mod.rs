// Domain layer: report models and the ports its collaborators implement.

pub mod model;
pub mod ports;
