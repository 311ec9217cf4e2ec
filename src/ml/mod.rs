// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// The domain layer stays backend-free; the application and
// CLI layers only see the public model API.
//
// What's in this layer (leaf-first):
//
//   init.rs         — Xavier-uniform helpers for rank-2 weights
//   attention.rs    — scaled dot-product attention primitive
//                     and multi-head attention
//   feed_forward.rs — position-wise FFN (Linear → ReLU → Linear)
//   norm.rs         — layer normalisation (unbiased std + eps)
//   sublayer.rs     — residual + normalisation wrapper
//   encoder.rs      — encoder layer and N-layer stack
//   decoder.rs      — decoder layer and N-layer stack
//   embedding.rs    — token embeddings + sinusoidal positions
//   generator.rs    — projection + log-softmax
//   mask.rs         — causal and padding masks
//   model.rs        — encoder-decoder composition and factory
//
// Every module is generic over `B: Backend`, so the same
// model runs on NdArray (CPU), WGPU, or an Autodiff wrapper
// around either.
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need

pub mod attention;
pub mod decoder;
pub mod embedding;
pub mod encoder;
pub mod feed_forward;
pub mod generator;
pub mod init;
pub mod mask;
pub mod model;
pub mod norm;
pub mod sublayer;

#[cfg(test)]
pub(crate) mod test_utils;
