// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust definitions shared by every other layer:
//
//   error.rs — the TransformerError enum and Result alias
//   shape.rs — shape-contract checks over plain dim slices
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and functions
//
// Keeping the contracts backend-free means they can be unit
// tested without constructing a single tensor.
//
// Reference: Rust Book §5 (Structs), §9 (Error Handling)

/// Error kinds raised by construction and forward calls
pub mod error;

/// Shape-contract helpers (broadcast, divisibility, last dim)
pub mod shape;

pub use error::{Result, TransformerError};
