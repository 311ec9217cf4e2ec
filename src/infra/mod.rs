// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to the model itself:
//
//   config_store.rs — saving and loading TransformerConfig as
//                     JSON so a run can be reproduced from a
//                     file instead of a long list of flags.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model hyperparameter persistence
pub mod config_store;
