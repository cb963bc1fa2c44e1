use crate::types::CandidateRecord;
use std::collections::HashSet;
use tracing::debug;

/// Titles already in the store, captured once at the start of a run.
///
/// The set is frozen: records persisted during the run are not added, so two
/// candidates sharing a new title in one page both pass the filter. Titles
/// compare exactly (case-sensitive, untrimmed).
#[derive(Debug, Clone, Default)]
pub struct KnownTitles {
    titles: HashSet<String>,
}

impl KnownTitles {
    pub fn new<I>(titles: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self { titles: titles.into_iter().collect() }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl FromIterator<String> for KnownTitles {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Yields the candidates whose title is not in `known`, unchanged and in order.
pub fn dedupe<'a, I>(candidates: I, known: &'a KnownTitles) -> impl Iterator<Item = CandidateRecord> + 'a
where
    I: IntoIterator<Item = CandidateRecord>,
    I::IntoIter: 'a,
{
    candidates.into_iter().filter(move |candidate| {
        let seen = known.contains(&candidate.title);
        if seen {
            debug!("Skipping known article: {}", candidate.title);
        }
        !seen
    })
}
