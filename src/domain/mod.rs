// Domain layer: core models and ports (interfaces). No transport or backend
// dependencies beyond serde/chrono/decimal.

pub mod model;
pub mod ports;
