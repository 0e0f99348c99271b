//! Left-to-right chained matrix products.
//!
//! The underlying multiply is binary; the filter recursions need 3-way
//! products like `F·P·Fᵀ` and `P·Hᵀ·S⁻¹`, so chaining is layered on top.

use nalgebra::DMatrix;

use crate::error::{FilterError, Result};

/// Multiply two or more matrices left to right.
///
/// The product is associative, so grouping does not change the result beyond
/// floating-point rounding. Fails with `InvalidArgument` for fewer than two
/// operands and `DimensionMismatch` when adjacent operands have incompatible
/// inner dimensions.
pub fn multiply_chain(operands: &[&DMatrix<f64>]) -> Result<DMatrix<f64>> {
    if operands.len() < 2 {
        return Err(FilterError::InvalidArgument(format!(
            "multiply_chain requires at least 2 operands, got {}",
            operands.len()
        )));
    }

    let mut product = operands[0].clone();
    for rhs in &operands[1..] {
        if product.ncols() != rhs.nrows() {
            return Err(FilterError::shape(
                "chained matrix product",
                (product.ncols(), rhs.ncols()),
                (rhs.nrows(), rhs.ncols()),
            ));
        }
        product = product * *rhs;
    }

    Ok(product)
}
