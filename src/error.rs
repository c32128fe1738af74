use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid trim size {width}x{height}, dimensions must be positive")]
    InvalidTrim { width: f64, height: f64 },

    #[error("invalid sheet size {width}x{height}, dimensions must be positive")]
    InvalidSheet { width: f64, height: f64 },

    #[error("failed to load constraints for product {product_id}: {message}")]
    ConstraintLoad { product_id: u32, message: String },
}
