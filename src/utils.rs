mod generate_correlation_id;
mod now;

pub use generate_correlation_id::generate_correlation_id;
pub use now::now;
