// ============================================================
// Layer 5 — Attention
// ============================================================
// Two pieces:
//
//   scaled_dot_product_attention — the primitive
//       scores  = Q · Kᵀ / √d_k
//       scores  = fill(scores, !mask, sentinel)
//       weights = softmax(scores, key axis)
//       out     = dropout(weights) · V
//
//   MultiHeadAttention — four Linear projections around the
//       primitive. Q/K/V are split into h heads of width
//       d_k = d_model / h, attended in ONE batched call over a
//       [batch, h, seq, d_k] tensor, then concatenated back to
//       [batch, seq, d_model] and projected.
//
// Masks use `true` = "this query may look at this key".
// Forbidden scores are overwritten with a large negative
// sentinel rather than -inf: a fully masked row then softmaxes
// to a uniform distribution instead of 0/0 = NaN.
//
// Reference: Vaswani et al. (2017) §3.2
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Dropout, DropoutConfig, Linear},
    prelude::*,
    tensor::activation::softmax,
};

use crate::domain::{
    shape::{ensure_broadcastable, ensure_last_dim, head_dim},
    Result, TransformerError,
};
use crate::ml::init::glorot_linear;

/// Fill value for forbidden scores, picked per float width.
///
/// | float width       | sentinel | exp(sentinel - max) |
/// |-------------------|----------|---------------------|
/// | 16 bit (f16/bf16) | -1e4     | underflows to 0     |
/// | 32 / 64 bit       | -1e9     | underflows to 0     |
///
/// f16 tops out at 65504, so -1e9 would become -inf there and
/// bring back the NaN this value exists to avoid.
pub fn mask_sentinel<B: Backend>() -> f64 {
    sentinel_for::<B::FloatElem>()
}

fn sentinel_for<E>() -> f64 {
    match core::mem::size_of::<E>() {
        2 => -1.0e4,
        _ => -1.0e9,
    }
}

/// Attention result plus the softmax weights for inspection.
#[derive(Debug, Clone)]
pub struct AttentionOutput<B: Backend, const D: usize> {
    /// weights · value, shape (..., seq_q, d_v)
    pub context: Tensor<B, D>,
    /// shape (..., seq_q, seq_k)
    pub weights: Tensor<B, D>,
}

/// Scaled dot-product attention over (..., seq, d_k) tensors.
///
/// `mask`, when given, must broadcast to the (..., seq_q, seq_k)
/// score tensor; dims of size 1 are expanded, anything else has
/// to match exactly.
pub fn scaled_dot_product_attention<B: Backend, const D: usize>(
    query:   Tensor<B, D>,
    key:     Tensor<B, D>,
    value:   Tensor<B, D>,
    mask:    Option<Tensor<B, D, Bool>>,
    dropout: Option<&Dropout>,
) -> Result<AttentionOutput<B, D>> {
    const OP: &str = "scaled_dot_product_attention";

    let q_dims = query.dims();
    let k_dims = key.dims();
    let v_dims = value.dims();

    if D < 2 {
        return Err(TransformerError::shape(OP, "rank >= 2", &q_dims));
    }
    let d_k = q_dims[D - 1];
    if d_k == 0 {
        return Err(TransformerError::shape(OP, "d_k > 0", &q_dims));
    }
    ensure_last_dim(OP, &k_dims, d_k)?;
    if q_dims[..D - 2] != k_dims[..D - 2] {
        return Err(TransformerError::shape(
            OP,
            format!("key leading dims {:?}", &q_dims[..D - 2]),
            &k_dims,
        ));
    }
    if v_dims[..D - 1] != k_dims[..D - 1] {
        return Err(TransformerError::shape(
            OP,
            format!("value leading dims {:?}", &k_dims[..D - 1]),
            &v_dims,
        ));
    }

    let scores = query
        .matmul(key.swap_dims(D - 2, D - 1))
        .div_scalar((d_k as f64).sqrt());

    let scores = match mask {
        Some(mask) => {
            let target = scores.dims();
            ensure_broadcastable(OP, &mask.dims(), &target)?;
            let forbidden = mask.expand(target).bool_not();
            scores.mask_fill(forbidden, mask_sentinel::<B>())
        }
        None => scores,
    };

    let weights = softmax(scores, D - 1);
    let weights = match dropout {
        Some(dropout) => dropout.forward(weights),
        None => weights,
    };
    let context = weights.clone().matmul(value);

    Ok(AttentionOutput { context, weights })
}

// ─── MultiHeadAttentionConfig ─────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct MultiHeadAttentionConfig {
    pub d_model: usize,
    pub n_heads: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl MultiHeadAttentionConfig {
    /// Fails with `HeadsDoNotDivideModel` before allocating anything
    /// when d_model is not a multiple of n_heads.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<MultiHeadAttention<B>> {
        let d_k = head_dim(self.d_model, self.n_heads)?;
        Ok(MultiHeadAttention {
            query:   glorot_linear(self.d_model, self.d_model, device),
            key:     glorot_linear(self.d_model, self.d_model, device),
            value:   glorot_linear(self.d_model, self.d_model, device),
            output:  glorot_linear(self.d_model, self.d_model, device),
            dropout: DropoutConfig::new(self.dropout).init(),
            n_heads: self.n_heads,
            d_k,
        })
    }
}

// ─── MultiHeadAttention ───────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct MultiHeadAttention<B: Backend> {
    pub query:   Linear<B>,
    pub key:     Linear<B>,
    pub value:   Linear<B>,
    pub output:  Linear<B>,
    pub dropout: Dropout,
    pub n_heads: usize,
    pub d_k:     usize,
}

/// Output of one multi-head attention call.
#[derive(Debug, Clone)]
pub struct MhaOutput<B: Backend> {
    /// [batch, seq_q, d_model]
    pub context: Tensor<B, 3>,
    /// [batch, n_heads, seq_q, seq_k]
    pub weights: Tensor<B, 4>,
}

impl<B: Backend> MultiHeadAttention<B> {
    pub fn d_model(&self) -> usize {
        self.n_heads * self.d_k
    }

    /// query: [batch, seq_q, d_model], key/value: [batch, seq_k, d_model],
    /// mask: [batch | 1, seq_q | 1, seq_k], shared by every head.
    pub fn forward(
        &self,
        query: Tensor<B, 3>,
        key:   Tensor<B, 3>,
        value: Tensor<B, 3>,
        mask:  Option<Tensor<B, 3, Bool>>,
    ) -> Result<MhaOutput<B>> {
        const OP: &str = "multi_head_attention";
        let d_model = self.d_model();

        ensure_last_dim(OP, &query.dims(), d_model)?;
        ensure_last_dim(OP, &key.dims(), d_model)?;
        ensure_last_dim(OP, &value.dims(), d_model)?;

        let [batch, seq_q, _] = query.dims();
        let [k_batch, seq_k, _] = key.dims();
        if k_batch != batch || value.dims() != key.dims() {
            return Err(TransformerError::shape(
                OP,
                format!("key/value of shape [{batch}, {seq_k}, {d_model}]"),
                &value.dims(),
            ));
        }

        // 1) project, then [batch, seq, d_model] → [batch, h, seq, d_k]
        let q = self.split_heads(self.query.forward(query), batch, seq_q);
        let k = self.split_heads(self.key.forward(key), batch, seq_k);
        let v = self.split_heads(self.value.forward(value), batch, seq_k);

        // 2) one batched attention call across all heads
        let mask = mask.map(|mask| mask.unsqueeze_dim::<4>(1));
        let AttentionOutput { context, weights } =
            scaled_dot_product_attention(q, k, v, mask, Some(&self.dropout))?;

        // 3) concat heads back into the feature axis
        let context = context.swap_dims(1, 2).reshape([batch, seq_q, d_model]);

        Ok(MhaOutput {
            context: self.output.forward(context),
            weights,
        })
    }

    fn split_heads(&self, x: Tensor<B, 3>, batch: usize, seq: usize) -> Tensor<B, 4> {
        x.reshape([batch, seq, self.n_heads, self.d_k]).swap_dims(1, 2)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_utils::{bool_tensor, device, to_vec, TestBackend};
    use burn::tensor::Distribution;

    fn random<const D: usize>(shape: [usize; D]) -> Tensor<TestBackend, D> {
        Tensor::random(shape, Distribution::Default, &device())
    }

    #[test]
    fn test_sentinel_for_f32() {
        assert_eq!(mask_sentinel::<TestBackend>(), -1.0e9);
        assert_eq!(sentinel_for::<f64>(), -1.0e9);
    }

    #[test]
    fn test_sentinel_for_half_precision_stays_finite() {
        use burn::tensor::{bf16, f16};

        assert_eq!(sentinel_for::<f16>(), -1.0e4);
        assert_eq!(sentinel_for::<bf16>(), -1.0e4);

        // -1e9 would saturate to -inf in f16; -1e4 survives the cast
        assert!(f16::from_f64(-1.0e9).to_f32().is_infinite());
        assert!(f16::from_f64(sentinel_for::<f16>()).to_f32().is_finite());
    }

    #[test]
    fn test_unmasked_rows_sum_to_one() {
        let (q, k, v) = (random([2, 3, 5, 4]), random([2, 3, 6, 4]), random([2, 3, 6, 4]));
        let out = scaled_dot_product_attention(q, k, v, None, None).unwrap();

        assert_eq!(out.context.dims(), [2, 3, 5, 4]);
        assert_eq!(out.weights.dims(), [2, 3, 5, 6]);
        for sum in to_vec(out.weights.sum_dim(3)) {
            assert!((sum - 1.0).abs() < 1e-5, "row sum {sum}");
        }
    }

    #[test]
    fn test_masked_keys_get_no_weight() {
        // Single query row, last two of four keys are padding
        let mask = bool_tensor([1, 1, 4], vec![true, true, false, false]);
        let (q, k, v) = (random([1, 3, 4]), random([1, 4, 4]), random([1, 4, 4]));

        let out = scaled_dot_product_attention(q, k, v, Some(mask), None).unwrap();
        let weights = to_vec(out.weights);

        for row in weights.chunks(4) {
            assert!(row[2] < 1e-6 && row[3] < 1e-6, "masked weights {row:?}");
            assert!((row[0] + row[1] - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_fully_masked_row_stays_finite() {
        let mask = bool_tensor([1, 2, 3], vec![false, false, false, true, true, true]);
        let (q, k, v) = (random([1, 2, 4]), random([1, 3, 4]), random([1, 3, 4]));

        let out = scaled_dot_product_attention(q, k, v, Some(mask), None).unwrap();
        let weights = to_vec(out.weights);

        assert!(weights.iter().all(|w| w.is_finite()));
        // Every score got the same sentinel, so the row is uniform
        for w in &weights[..3] {
            assert!((w - 1.0 / 3.0).abs() < 1e-5);
        }
        assert!(to_vec(out.context).iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_mask_must_broadcast() {
        let mask = bool_tensor([1, 1, 3], vec![true; 3]);
        let (q, k, v) = (random([1, 2, 4]), random([1, 4, 4]), random([1, 4, 4]));

        let err = scaled_dot_product_attention(q, k, v, Some(mask), None).unwrap_err();
        assert!(matches!(err, TransformerError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_key_width_must_match_query() {
        let (q, k, v) = (random([1, 2, 4]), random([1, 2, 5]), random([1, 2, 5]));
        assert!(scaled_dot_product_attention(q, k, v, None, None).is_err());
    }

    #[test]
    fn test_construction_requires_divisible_heads() {
        let device = device();
        assert!(MultiHeadAttentionConfig::new(16, 4).init::<TestBackend>(&device).is_ok());

        let err = MultiHeadAttentionConfig::new(16, 3)
            .init::<TestBackend>(&device)
            .unwrap_err();
        assert_eq!(err, TransformerError::HeadsDoNotDivideModel { d_model: 16, n_heads: 3 });
    }

    #[test]
    fn test_multi_head_shapes() {
        let mha = MultiHeadAttentionConfig::new(16, 4)
            .with_dropout(0.0)
            .init::<TestBackend>(&device())
            .unwrap();
        let x = random([2, 5, 16]);
        let memory = random([2, 7, 16]);

        let out = mha.forward(x, memory.clone(), memory, None).unwrap();

        assert_eq!(out.context.dims(), [2, 5, 16]);
        // Per head: (seq_q, seq_k) weights over (seq_q, d_k) outputs
        assert_eq!(out.weights.dims(), [2, 4, 5, 7]);
        assert_eq!(mha.d_k, 4);
    }

    #[test]
    fn test_one_mask_covers_every_head() {
        let mha = MultiHeadAttentionConfig::new(8, 2)
            .with_dropout(0.0)
            .init::<TestBackend>(&device())
            .unwrap();
        let x = random([1, 3, 8]);
        let mask = bool_tensor([1, 1, 3], vec![true, false, true]);

        let out = mha.forward(x.clone(), x.clone(), x, Some(mask)).unwrap();
        let weights = to_vec(out.weights);

        // [1, 2, 3, 3]: key 1 is masked in every row of every head
        for row in weights.chunks(3) {
            assert!(row[1] < 1e-6);
        }
    }

    #[test]
    fn test_rejects_wrong_feature_width() {
        let mha = MultiHeadAttentionConfig::new(8, 2)
            .init::<TestBackend>(&device())
            .unwrap();
        let x = random([1, 3, 6]);
        assert!(mha.forward(x.clone(), x.clone(), x, None).is_err());
    }
}
