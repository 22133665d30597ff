// Raw matcher output, one file per stream
//
// Candidate generation is expensive, so its output is persisted and later
// runs replay it. Files are named after the stream's short name ("l4",
// "l42", ...), negatives after their source ("neg_l42", "neg_l52") and the
// coherence group keys go to "coh_groups".
use crate::format::{read_matchings, write_matchings};
use semprop_core::{
    CandidateSet, CandidateStreams, CoherenceGroups, Error, Matching, MatchingType, NegativeSet,
    Result,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const NEGATIVE_PREFIX: &str = "neg_";

pub const COHERENCE_GROUPS: &str = "coh_groups";

/// Streams that produce negative signals
const NEGATIVE_SOURCES: [MatchingType; 2] = [
    MatchingType::L42ClassNameRelationNameSem,
    MatchingType::L52ClassNameAttrNameSem,
];

pub fn negative_name(source: MatchingType) -> String {
    format!("{}{}", NEGATIVE_PREFIX, source.short_name())
}

/// Directory of persisted raw results
#[derive(Debug, Clone)]
pub struct RawResultStore {
    dir: PathBuf,
}

impl RawResultStore {
    /// Open a store, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    pub fn save(&self, name: &str, matchings: &[Matching]) -> Result<()> {
        write_matchings(self.path_of(name), matchings)?;
        debug!(name, count = matchings.len(), "saved raw result");
        Ok(())
    }

    /// Load a named result. A missing file is [`Error::MissingResult`].
    pub fn load(&self, name: &str) -> Result<Vec<Matching>> {
        if !self.exists(name) {
            return Err(Error::MissingResult(name.to_string()));
        }
        let matchings = read_matchings(self.path_of(name))?;
        debug!(name, count = matchings.len(), "loaded raw result");
        Ok(matchings)
    }

    /// Persist every stream, negative set and the coherence groups
    pub fn save_streams(&self, streams: &CandidateStreams) -> Result<()> {
        for set in streams.streams() {
            self.save(set.matching_type().short_name(), set.matchings())?;
        }
        for source in NEGATIVE_SOURCES {
            let negatives = streams
                .negatives(source)
                .map(NegativeSet::matchings)
                .unwrap_or_default();
            self.save(&negative_name(source), negatives)?;
        }
        let groups: Vec<Matching> = streams
            .coherence_groups()
            .sorted_keys()
            .into_iter()
            .cloned()
            .collect();
        self.save(COHERENCE_GROUPS, &groups)?;

        info!(
            dir = %self.dir.display(),
            total = streams.total_candidates(),
            coherence_groups = groups.len(),
            "saved raw results"
        );
        Ok(())
    }

    /// Rebuild candidate streams from disk.
    ///
    /// Every stream except L1 must be present. Coherence groups come from
    /// `coh_groups`; directories without that file fall back to the
    /// table-level projection of the L6 stream.
    pub fn load_streams(&self) -> Result<CandidateStreams> {
        let mut streams = CandidateStreams::new();
        let mut l6_projection = CoherenceGroups::new();

        for matching_type in MatchingType::ALL {
            let name = matching_type.short_name();
            let optional = matching_type == MatchingType::L1ClassNameAttrValue;
            let matchings = if optional && !self.exists(name) {
                debug!(name, "optional raw result absent");
                Vec::new()
            } else {
                self.load(name)?
            };
            if matching_type == MatchingType::L6ClassNameRelationSemCoherence {
                l6_projection = CoherenceGroups::from_matchings(&matchings);
            }
            streams = streams.with_candidates(CandidateSet::new(matching_type, matchings));
        }

        let groups = if self.exists(COHERENCE_GROUPS) {
            CoherenceGroups::from_matchings(&self.load(COHERENCE_GROUPS)?)
        } else {
            debug!(name = COHERENCE_GROUPS, "absent; projecting l6");
            l6_projection
        };

        for source in NEGATIVE_SOURCES {
            let negatives = self.load(&negative_name(source))?;
            streams = streams.with_negatives(NegativeSet::new(source, negatives)?);
        }

        info!(
            dir = %self.dir.display(),
            total = streams.total_candidates(),
            coherence_groups = groups.len(),
            "loaded raw results"
        );
        Ok(streams.with_coherence_groups(groups))
    }
}
