// ============================================================
// Layer 5 — Attention Masks
// ============================================================
// All masks use `true` = "may attend".
//
//   subsequent_mask(n)   [1, n, n]    causal: (i, j) allowed iff j <= i
//   padding_mask(ids)    [batch, 1, len]   false on pad tokens
//   target_mask(ids)     [batch, len, len] padding AND causal
//
// Example, subsequent_mask(4):
//   row 0: T F F F
//   row 1: T T F F
//   row 2: T T T F
//   row 3: T T T T
//
// The decoder's self-attention must combine the causal mask
// with the batch's own padding mask; target_mask does both.

use burn::{prelude::*, tensor::TensorData};

/// Backend-free causal mask as nested rows.
pub fn subsequent_mask_rows(size: usize) -> Vec<Vec<bool>> {
    (0..size)
        .map(|i| (0..size).map(|j| j <= i).collect())
        .collect()
}

/// Causal mask of shape [1, size, size].
pub fn subsequent_mask<B: Backend>(size: usize, device: &B::Device) -> Tensor<B, 3, Bool> {
    let values: Vec<bool> = subsequent_mask_rows(size).into_iter().flatten().collect();
    Tensor::from_data(TensorData::new(values, [1, size, size]), device)
}

/// [batch, len] ids → [batch, 1, len], false where `ids == pad`.
pub fn padding_mask<B: Backend>(ids: Tensor<B, 2, Int>, pad: i64) -> Tensor<B, 3, Bool> {
    ids.equal_elem(pad).bool_not().unsqueeze_dim(1)
}

/// Decoder self-attention mask: padding AND causal, [batch, len, len].
pub fn target_mask<B: Backend>(ids: Tensor<B, 2, Int>, pad: i64) -> Tensor<B, 3, Bool> {
    let [batch, len] = ids.dims();
    let device = ids.device();

    let padding = padding_mask(ids, pad).expand([batch, len, len]);
    let causal = subsequent_mask::<B>(len, &device).expand([batch, len, len]);

    padding.bool_and(causal)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_utils::{device, int_tensor, TestBackend};

    fn to_bools<const D: usize>(mask: Tensor<TestBackend, D, Bool>) -> Vec<bool> {
        mask.into_data().to_vec::<bool>().unwrap()
    }

    #[test]
    fn test_subsequent_mask_of_four() {
        let (t, f) = (true, false);
        assert_eq!(
            subsequent_mask_rows(4),
            vec![
                vec![t, f, f, f],
                vec![t, t, f, f],
                vec![t, t, t, f],
                vec![t, t, t, t],
            ]
        );

        let mask = subsequent_mask::<TestBackend>(4, &device());
        assert_eq!(mask.dims(), [1, 4, 4]);
        assert_eq!(
            to_bools(mask),
            vec![t, f, f, f, t, t, f, f, t, t, t, f, t, t, t, t]
        );
    }

    #[test]
    fn test_padding_mask() {
        let ids = int_tensor([2, 3], vec![5, 7, 0, 3, 0, 0]);
        let mask = padding_mask(ids, 0);

        assert_eq!(mask.dims(), [2, 1, 3]);
        assert_eq!(to_bools(mask), vec![true, true, false, true, false, false]);
    }

    #[test]
    fn test_target_mask_combines_padding_and_causal() {
        let ids = int_tensor([1, 3], vec![4, 8, 0]);
        let mask = target_mask(ids, 0);

        assert_eq!(mask.dims(), [1, 3, 3]);
        assert_eq!(
            to_bools(mask),
            vec![
                true, false, false,
                true, true,  false,
                true, true,  false,
            ]
        );
    }
}
