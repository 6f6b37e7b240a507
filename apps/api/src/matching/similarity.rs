use super::ScoringError;

/// Cosine of the angle between `a` and `b`, in [-1, 1].
///
/// Returns exactly 0.0 when either vector has zero magnitude or a
/// non-finite component. Mismatched lengths are an error, never truncated.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, ScoringError> {
    if a.len() != b.len() {
        return Err(ScoringError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return Ok(0.0);
    }
    Ok(similarity.clamp(-1.0, 1.0))
}

/// The `k` items most similar to `query`, most similar first.
///
/// Equal similarities keep their input order. Fails on the first item whose
/// embedding has a different dimension than the query.
pub fn top_similar<'a, T, F>(
    query: &[f32],
    items: &'a [T],
    k: usize,
    embedding_of: F,
) -> Result<Vec<(&'a T, f64)>, ScoringError>
where
    F: Fn(&T) -> &[f32],
{
    let mut scored = items
        .iter()
        .map(|item| cosine_similarity(query, embedding_of(item)).map(|s| (item, s)))
        .collect::<Result<Vec<_>, _>>()?;

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);
    Ok(scored)
}
