//! Probability distributions used by the meshers and density initialisers.

pub mod chi_square;
pub mod normal;

pub use chi_square::{
    non_central_chi_square_cdf, non_central_chi_square_pdf, non_central_chi_square_quantile,
};
pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
