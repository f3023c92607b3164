// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Vector post-processing: float coercion, L2 normalization, dims inference

use crate::embeddings::EmbedResponse;

/// Euclidean norm of a vector
pub fn l2_norm(vector: &[f64]) -> f64 {
    vector.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Scales `vector` to unit length in place
///
/// A zero vector is left untouched.
pub fn l2_normalize(vector: &mut [f64]) {
    let norm = l2_norm(vector);
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Converts raw encoder output into the response shape
///
/// Components are widened to `f64` whatever numeric type the encoder used.
/// `dims` is the length of the first vector; the remaining vectors are
/// assumed to match.
pub fn postprocess<T>(vectors: &[Vec<T>], normalize: bool) -> EmbedResponse
where
    T: Copy + Into<f64>,
{
    let vectors: Vec<Vec<f64>> = vectors
        .iter()
        .map(|raw| {
            let mut vector: Vec<f64> = raw.iter().map(|&x| x.into()).collect();
            if normalize {
                l2_normalize(&mut vector);
            }
            vector
        })
        .collect();

    let dims = vectors.first().map(Vec::len).unwrap_or(0);

    EmbedResponse { vectors, dims }
}
