pub mod input;

pub use input::{Cell, DataInput, VecDataInput};
