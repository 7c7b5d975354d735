mod feature;
mod field;
mod layer;
mod notice;

pub use feature::*;
pub use field::*;
pub use layer::*;
pub use notice::*;
