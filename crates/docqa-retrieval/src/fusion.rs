//! Relative-score fusion for hybrid search.
//!
//! Each sub-score list (vector similarity, keyword relevance) is min-max
//! normalized to [0, 1] independently, then combined as
//! `alpha * vector_norm + (1 - alpha) * keyword_norm`. An alpha of 1 is a
//! pure vector ranking, 0 a pure keyword ranking.

use std::collections::HashMap;

/// Fuse two similarity lists (higher is better in both) into one ranking,
/// descending by fused score, truncated to `k`.
pub fn relative_score_fusion(
    vector_results: &[(String, f32)],
    keyword_results: &[(String, f32)],
    alpha: f32,
    k: usize,
) -> Vec<(String, f32)> {
    let mut scores: HashMap<&str, f32> =
        HashMap::with_capacity(vector_results.len() + keyword_results.len());

    accumulate(&mut scores, vector_results, alpha);
    accumulate(&mut scores, keyword_results, 1.0 - alpha);

    let mut fused: Vec<(String, f32)> =
        scores.into_iter().map(|(id, s)| (id.to_string(), s)).collect();
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    fused.truncate(k);
    fused
}

fn accumulate<'a>(
    scores: &mut HashMap<&'a str, f32>,
    results: &'a [(String, f32)],
    weight: f32,
) {
    let Some((min, max)) = min_max(results) else {
        return;
    };
    let range = max - min;
    for (id, score) in results {
        // A degenerate list (all scores equal) normalizes to 1.0 so a
        // single hit still carries its full weight.
        let norm = if range < f32::EPSILON { 1.0 } else { (score - min) / range };
        *scores.entry(id.as_str()).or_insert(0.0) += weight * norm;
    }
}

fn min_max(results: &[(String, f32)]) -> Option<(f32, f32)> {
    if results.is_empty() {
        return None;
    }
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &(_, s) in results {
        if s < min {
            min = s;
        }
        if s > max {
            max = s;
        }
    }
    Some((min, max))
}
