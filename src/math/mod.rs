pub mod decomp;
pub mod ziggurat;

pub use decomp::{arg_max, naive_vector_decomp};
pub use ziggurat::{norm_inv_cdf, normal_pdf, Ziggurat};
