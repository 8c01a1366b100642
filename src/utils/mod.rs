mod seq16;

pub use seq16::*;
