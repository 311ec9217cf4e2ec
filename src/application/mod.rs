// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the model layer to accomplish one goal.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Build a model and run one seeded forward pass end to end
pub mod inspect_use_case;
