//! Evaluation engine: validate score batches, aggregate and rank them.
//!
//! Scores either come from outside (an evaluation service or user-supplied
//! data, see [`score_raw`]) or from the built-in [`rubric`] applied to
//! generation results ([`score_results`]). Either way, a batch is only
//! aggregated over entries that share the majority criterion set; the rest
//! are dropped with a [`ScoreWarning`].

pub mod rubric;

use std::collections::{BTreeMap, HashSet};

use crate::domain::{
    AggregateStats, BenchError, Evaluation, EvaluationScore, GenerationResult, RawScore, Result,
    ScoreWarning,
};
use crate::metrics::METRICS;
use crate::obs;

/// A batch after schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBatch {
    /// Entries sharing the majority criterion set, in input order.
    pub scores: Vec<EvaluationScore>,
    pub warnings: Vec<ScoreWarning>,
    /// The majority criterion set, sorted.
    pub criteria: Vec<String>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Score successful generation results with the built-in rubric.
///
/// Results with an error or without content are skipped.
pub fn score_results(results: &[GenerationResult]) -> Vec<EvaluationScore> {
    results
        .iter()
        .filter(|r| r.error.is_none())
        .filter_map(|r| {
            let content = r.content.as_deref().filter(|c| !c.trim().is_empty())?;
            let scores: BTreeMap<String, f64> = rubric::score_content(content);
            let average_score = mean(scores.values().copied());
            Some(EvaluationScore {
                agent_id: r.agent_id.clone(),
                scores,
                average_score,
            })
        })
        .collect()
}

/// Turn externally supplied entries into scores.
///
/// Missing ids, duplicate ids, empty criterion maps and non-finite values
/// are all `InvalidInput`.
pub fn score_raw(raw: Vec<RawScore>) -> Result<Vec<EvaluationScore>> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|entry| {
            let agent_id = entry.agent_id()?;
            if !seen.insert(agent_id.clone()) {
                return Err(BenchError::invalid(format!(
                    "duplicate score entry for agent {agent_id}"
                )));
            }
            EvaluationScore::new(&agent_id, entry.scores)
        })
        .collect()
}

/// Parse raw scores from JSON: either `{"evaluations": [...]}` or a bare array.
pub fn parse_raw_scores(json: &str) -> Result<Vec<RawScore>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let entries = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map
            .remove("evaluations")
            .ok_or_else(|| BenchError::invalid("expected an \"evaluations\" array"))?,
        _ => return Err(BenchError::invalid("expected a JSON array of score entries")),
    };
    Ok(serde_json::from_value(entries)?)
}

/// Keep the entries that share the majority criterion set.
///
/// The majority set is the one used by the most entries; on a tie, the set
/// that appears first wins.
pub fn validate_batch(scores: Vec<EvaluationScore>) -> ValidatedBatch {
    let mut groups: Vec<(Vec<String>, usize)> = Vec::new();
    for score in &scores {
        let keys: Vec<String> = score.scores.keys().cloned().collect();
        match groups.iter_mut().find(|(k, _)| *k == keys) {
            Some((_, count)) => *count += 1,
            None => groups.push((keys, 1)),
        }
    }

    let mut criteria: Vec<String> = Vec::new();
    let mut best = 0;
    for (keys, count) in groups {
        if count > best {
            best = count;
            criteria = keys;
        }
    }

    let mut valid = Vec::with_capacity(scores.len());
    let mut warnings = Vec::new();
    for score in scores {
        if score.scores.keys().eq(criteria.iter()) {
            valid.push(score);
        } else {
            let warning = ScoreWarning {
                agent_id: score.agent_id.clone(),
                expected_criteria: criteria.clone(),
                found_criteria: score.scores.keys().cloned().collect(),
            };
            obs::emit_schema_mismatch(&warning);
            warnings.push(warning);
        }
    }
    if !warnings.is_empty() {
        METRICS.add_scores_dropped(warnings.len() as u64);
    }

    ValidatedBatch {
        scores: valid,
        warnings,
        criteria,
    }
}

fn stats_of(valid: &[EvaluationScore], criteria_count: usize) -> Result<AggregateStats> {
    if valid.is_empty() {
        return Err(BenchError::NoValidScores);
    }
    let avg_score = mean(valid.iter().map(|s| s.average_score));
    let highest_score = valid
        .iter()
        .map(|s| s.average_score)
        .fold(f64::NEG_INFINITY, f64::max);
    Ok(AggregateStats {
        avg_score,
        highest_score,
        total_evaluations: valid.len(),
        category_count: criteria_count,
    })
}

/// Compute aggregate statistics over the valid entries of `scores`.
///
/// Mismatched entries are excluded (and warned about); fails with
/// `NoValidScores` when nothing is left.
pub fn aggregate(scores: &[EvaluationScore]) -> Result<AggregateStats> {
    let batch = validate_batch(scores.to_vec());
    stats_of(&batch.scores, batch.criteria.len())
}

/// Order by `average_score` descending, then `agent_id` ascending.
pub fn rank(mut scores: Vec<EvaluationScore>) -> Vec<EvaluationScore> {
    scores.sort_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then_with(|| a.agent_id.cmp(&b.agent_id))
    });
    scores
}

/// Validate, aggregate and rank one batch.
pub fn evaluate(scores: Vec<EvaluationScore>) -> Result<Evaluation> {
    let batch = validate_batch(scores);
    let stats = stats_of(&batch.scores, batch.criteria.len())?;
    obs::emit_evaluation_aggregated(stats.total_evaluations, stats.avg_score, stats.highest_score);
    Ok(Evaluation {
        scores: rank(batch.scores),
        stats,
        warnings: batch.warnings,
    })
}
