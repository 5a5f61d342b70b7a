use std::sync::Arc;

use tracing::{debug, warn};

use shared_database::SlotStore;
use shared_models::Doctor;

use crate::models::{DoctorError, RosterMatch};

pub struct DoctorService {
    store: Arc<dyn SlotStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Full roster. An empty roster means the store could not hand one back,
    /// never that the clinic has no doctors.
    pub async fn get_roster(&self) -> Result<Vec<Doctor>, DoctorError> {
        let doctors = self.store.list_doctors().await?;

        if doctors.is_empty() {
            warn!("Doctor roster came back empty");
            return Err(DoctorError::EmptyRoster);
        }

        debug!("Roster has {} doctors", doctors.len());
        Ok(doctors)
    }

    pub async fn find_doctor(&self, query: &str) -> Result<RosterMatch, DoctorError> {
        let roster = self.get_roster().await?;
        Ok(match_roster(&roster, query))
    }
}

/// Case-insensitive substring lookup against the roster.
pub fn match_roster(roster: &[Doctor], query: &str) -> RosterMatch {
    let mut matches: Vec<Doctor> = roster
        .iter()
        .filter(|doctor| doctor.name_matches(query))
        .cloned()
        .collect();

    match matches.len() {
        0 => RosterMatch::NotFound {
            roster: roster.iter().map(|doctor| doctor.name.clone()).collect(),
        },
        1 => RosterMatch::Unique(matches.remove(0)),
        _ => RosterMatch::Ambiguous(matches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_utils::test_utils::{doctor, InMemorySlotStore};

    fn roster() -> Vec<Doctor> {
        vec![
            doctor("Dr. Ahmed Khan", "General"),
            doctor("Dr. Sara Malik", "Cosmetic"),
            doctor("Dr. Sarah Lee", "Orthodontics"),
        ]
    }

    #[test]
    fn unique_match_returns_roster_entry() {
        assert_matches!(match_roster(&roster(), "ahmed"), RosterMatch::Unique(d) if d.name == "Dr. Ahmed Khan");
    }

    #[test]
    fn overlapping_names_are_ambiguous() {
        assert_matches!(match_roster(&roster(), "Sara"), RosterMatch::Ambiguous(ds) if ds.len() == 2);
    }

    #[test]
    fn no_match_lists_whole_roster() {
        assert_matches!(
            match_roster(&roster(), "Dr. Unknown"),
            RosterMatch::NotFound { roster } if roster == vec!["Dr. Ahmed Khan", "Dr. Sara Malik", "Dr. Sarah Lee"]
        );
    }

    #[tokio::test]
    async fn empty_roster_is_an_error() {
        let service = DoctorService::new(Arc::new(InMemorySlotStore::new(vec![])));
        assert_matches!(service.get_roster().await, Err(DoctorError::EmptyRoster));
    }
}
