//! Candidate ranking by composite score

use cohort_criteria::{Criterion, ScoreTable};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::context::{ScoreContext, ScoreDiagnostics};
use crate::engine::CriterionEvaluator;
use crate::error::EvalResult;

/// One patient's position in a ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub patient_id: String,
    pub score: f64,
    pub diagnostics: ScoreDiagnostics,
}

impl CriterionEvaluator {
    /// Score every patient's table and order by score, highest first
    ///
    /// Patients with equal scores keep their input order.
    pub fn rank_candidates(
        &self,
        root: &Criterion,
        tables: &IndexMap<String, ScoreTable>,
    ) -> EvalResult<Vec<RankedCandidate>> {
        self.validate(root)?;

        let mut ranked: Vec<RankedCandidate> = tables
            .iter()
            .map(|(patient_id, table)| {
                let mut ctx = ScoreContext::new(table);
                let score = self.score_criterion(root, &mut ctx);
                let score = ctx.finite(root.node_uid(), score);
                RankedCandidate {
                    patient_id: patient_id.clone(),
                    score,
                    diagnostics: ctx.diagnostics(),
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!("Ranked {} candidates for criterion {}", ranked.len(), root.node_uid());
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_criteria::{CandidateScore, ClinicalEntityType, ValueLocationPath, ValuePredicate, ValueRelation};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_descending_with_stable_ties() {
        let leaf = Criterion::entity(
            ClinicalEntityType::Person,
            vec![ValuePredicate::new(ValueLocationPath::PersonGender, ValueRelation::Eq, ["female"])],
        );
        let uid = leaf.node_uid();
        let root = Criterion::and(vec![leaf]);

        let mut tables = IndexMap::new();
        for (patient, score) in [("p1", 0.2), ("p2", 0.9), ("p3", 0.2), ("p4", 0.5)] {
            let mut table = ScoreTable::new();
            table.insert(uid, CandidateScore::new(patient, score, [format!("PERSON:{}", patient)]));
            tables.insert(patient.to_string(), table);
        }
        tables.insert("p5".to_string(), ScoreTable::new());

        let order: Vec<String> = CriterionEvaluator::new()
            .rank_candidates(&root, &tables)
            .unwrap()
            .into_iter()
            .map(|c| c.patient_id)
            .collect();
        assert_eq!(order, vec!["p2", "p4", "p1", "p3", "p5"]);
    }
}
