use std::collections::HashMap;

use crate::Candidate;

/// Reorders `candidates` following `ranked_ids`.
///
/// Ids that are unknown or repeated are skipped. Candidates the ranking omitted keep their
/// relative order and are appended after the ranked ones, so the output is always a permutation
/// of the input.
pub fn apply_ranking(candidates: Vec<Candidate>, ranked_ids: &[String]) -> Vec<Candidate> {
	let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
	let mut positions: HashMap<String, usize> = HashMap::with_capacity(slots.len());

	for (index, slot) in slots.iter().enumerate() {
		if let Some(candidate) = slot {
			positions.entry(candidate.id.clone()).or_insert(index);
		}
	}

	let mut out = Vec::with_capacity(slots.len());

	for id in ranked_ids {
		let Some(index) = positions.remove(id.trim()) else {
			continue;
		};

		if let Some(candidate) = slots[index].take() {
			out.push(candidate);
		}
	}

	out.extend(slots.into_iter().flatten());

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidate(id: &str) -> Candidate {
		Candidate::new(id, id, id)
	}

	fn ids(candidates: &[Candidate]) -> Vec<&str> {
		candidates.iter().map(|c| c.id.as_str()).collect()
	}

	fn strings(values: &[&str]) -> Vec<String> {
		values.iter().map(|v| v.to_string()).collect()
	}

	#[test]
	fn omitted_ids_are_appended_in_original_order() {
		let input = vec![candidate("A"), candidate("B"), candidate("C")];
		let out = apply_ranking(input, &strings(&["C", "A"]));

		assert_eq!(ids(&out), vec!["C", "A", "B"]);
	}

	#[test]
	fn unknown_and_repeated_ids_are_ignored() {
		let input = vec![candidate("A"), candidate("B"), candidate("C")];
		let out = apply_ranking(input, &strings(&["B", "Z", "B", "A"]));

		assert_eq!(ids(&out), vec!["B", "A", "C"]);
	}

	#[test]
	fn empty_ranking_is_identity() {
		let input = vec![candidate("A"), candidate("B")];
		let out = apply_ranking(input, &[]);

		assert_eq!(ids(&out), vec!["A", "B"]);
	}
}
