pub mod product;

// Re-exports for convenience
pub use product::*;
