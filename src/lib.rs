pub mod calc;
pub mod model;
pub mod validate;
