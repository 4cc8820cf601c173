use std::collections::HashMap;

pub const TIME_PREFIX: &str = "Time (s) ";
pub const COUNTS_PREFIX: &str = "Geiger Counts (counts/sample) ";

/// Index of a column in the source table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColumnRef(pub usize);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trial {
    pub id: String,
    pub time: Option<ColumnRef>,
    pub counts: Option<ColumnRef>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Role {
    Time,
    Counts,
}

fn classify(name: &str) -> Option<(Role, &str)> {
    if let Some(rest) = name.strip_prefix(TIME_PREFIX) {
        Some((Role::Time, rest.trim()))
    } else if let Some(rest) = name.strip_prefix(COUNTS_PREFIX) {
        Some((Role::Counts, rest.trim()))
    } else {
        None
    }
}

/// Groups columns into trials by the id that follows the time/counts prefix.
///
/// Trials come back in order of first mention. Column order within a trial
/// does not matter, and a repeated role for the same id keeps the first column.
/// Columns matching neither prefix are ignored.
pub fn group_columns<S: AsRef<str>>(names: &[S]) -> Vec<Trial> {
    let mut trials: Vec<Trial> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    for (idx, name) in names.iter().enumerate() {
        let Some((role, id)) = classify(name.as_ref()) else {
            continue;
        };
        let slot = *by_id.entry(id.to_string()).or_insert_with(|| {
            trials.push(Trial {
                id: id.to_string(),
                time: None,
                counts: None,
            });
            trials.len() - 1
        });
        let trial = &mut trials[slot];
        let field = match role {
            Role::Time => &mut trial.time,
            Role::Counts => &mut trial.counts,
        };
        if field.is_none() {
            *field = Some(ColumnRef(idx));
        }
    }
    trials
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_time_and_counts_with_counts_only_trial() {
        let cols = [
            "Time (s) A",
            "Geiger Counts (counts/sample) A",
            "Geiger Counts (counts/sample) B",
        ];
        let trials = group_columns(&cols);
        assert_eq!(
            trials,
            vec![
                Trial {
                    id: "A".to_string(),
                    time: Some(ColumnRef(0)),
                    counts: Some(ColumnRef(1)),
                },
                Trial {
                    id: "B".to_string(),
                    time: None,
                    counts: Some(ColumnRef(2)),
                },
            ]
        );
    }

    #[test]
    fn grouping_ignores_declaration_order() {
        let forward = group_columns(&["Time (s) Run 1", "Geiger Counts (counts/sample) Run 1"]);
        let reverse = group_columns(&["Geiger Counts (counts/sample) Run 1", "Time (s) Run 1"]);
        assert_eq!(forward.len(), 1);
        assert_eq!(reverse.len(), 1);
        assert_eq!(forward[0].time, Some(ColumnRef(0)));
        assert_eq!(forward[0].counts, Some(ColumnRef(1)));
        assert_eq!(reverse[0].time, Some(ColumnRef(1)));
        assert_eq!(reverse[0].counts, Some(ColumnRef(0)));
    }

    #[test]
    fn time_only_trial_has_no_counts() {
        let trials = group_columns(&["Time (s) C"]);
        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0].counts, None);
    }

    #[test]
    fn unrecognized_columns_are_ignored() {
        let trials = group_columns(&[
            "Latitude",
            "Time (s)",
            "Geiger Counts",
            "Geiger Counts (counts/sample) D",
        ]);
        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0].id, "D");
        assert_eq!(trials[0].counts, Some(ColumnRef(3)));
    }

    #[test]
    fn ids_are_trimmed() {
        let trials = group_columns(&["Time (s)  5Hz ", "Geiger Counts (counts/sample) 5Hz"]);
        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0].id, "5Hz");
    }

    #[test]
    fn first_column_wins_for_repeated_role() {
        let trials = group_columns(&[
            "Geiger Counts (counts/sample) A",
            "Geiger Counts (counts/sample) A",
        ]);
        assert_eq!(trials[0].counts, Some(ColumnRef(0)));
    }
}
