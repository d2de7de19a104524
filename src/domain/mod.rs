// Domain layer: record model and the data-access port. No I/O here.

pub mod model;
pub mod ports;
