pub mod irr;
pub mod model;
