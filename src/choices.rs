//! Choice-set deduplication
//!
//! Component libraries often repeat the same option list ("Yes / No / Unsure",
//! county lists) on many multiple-choice variables. Lists that hold the same
//! options, in any order, are hoisted into one shared [`ChoiceSet`] named after
//! the first variable that declared them, and every contributing variable is
//! rewritten to reference it.
//!
//! The pairwise comparison is quadratic in the number of choice variables,
//! which stays small for a single library.

use crate::model::{Choice, ChoiceSet, ChoiceSource, Variable};

/// Hoist identical option lists into shared sets
///
/// Returns the number of variables rewritten. Does nothing when `sets` is
/// already populated, so calling it again is harmless.
///
/// ```rust
/// use interview_converter::choices::deduplicate;
/// use interview_converter::model::{Choice, ChoiceSource, Datatype, Variable, VariableKind};
///
/// let mc = |name: &str, options: Vec<Choice>| Variable {
///     name: name.to_string(),
///     da_name: name.to_lowercase(),
///     prompt: None,
///     help: None,
///     kind: VariableKind::MultipleChoice {
///         datatype: Datatype::Radio,
///         options: ChoiceSource::List(options),
///     },
/// };
/// let mut vars = vec![
///     mc("First", vec![Choice::new("A", "a"), Choice::new("B", "b")]),
///     mc("Second", vec![Choice::new("B", "b"), Choice::new("A", "a")]),
/// ];
/// let mut sets = Vec::new();
///
/// assert_eq!(deduplicate(&mut vars, &mut sets), 2);
/// assert_eq!(sets[0].name, "first_choices");
/// ```
pub fn deduplicate(variables: &mut [Variable], sets: &mut Vec<ChoiceSet>) -> usize {
    if !sets.is_empty() {
        return 0;
    }

    let sorted: Vec<Option<Vec<Choice>>> = variables
        .iter()
        .map(|var| {
            var.options().and_then(ChoiceSource::list).map(|list| {
                let mut list = list.to_vec();
                list.sort();
                list
            })
        })
        .collect();

    let mut assigned: Vec<Option<String>> = vec![None; variables.len()];
    for i in 0..variables.len() {
        if assigned[i].is_some() {
            continue;
        }
        let Some(ref options) = sorted[i] else {
            continue;
        };

        let mut shared: Option<String> = None;
        for j in (i + 1)..variables.len() {
            if assigned[j].is_some() || sorted[j].as_ref() != Some(options) {
                continue;
            }
            let name = shared
                .get_or_insert_with(|| format!("{}_choices", variables[i].da_name))
                .clone();
            assigned[j] = Some(name);
        }

        if let Some(name) = shared {
            tracing::debug!(choice_set = %name, "sharing option list");
            assigned[i] = Some(name.clone());
            sets.push(ChoiceSet {
                name,
                choices: options.clone(),
            });
        }
    }

    let mut rewritten = 0;
    for (var, name) in variables.iter_mut().zip(assigned) {
        if let (Some(name), Some(options)) = (name, var.options_mut()) {
            *options = ChoiceSource::Shared(name);
            rewritten += 1;
        }
    }
    rewritten
}
