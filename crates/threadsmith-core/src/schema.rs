//! Result Schema: the record types every task output must conform to.
//!
//! All numeric scores are bounded to [0, 100] and the bounds are enforced at
//! construction, including during deserialization. Candidate identifiers are
//! a closed three-member set. `FinalOutput` ties a run together and checks
//! its own cross-field invariants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from constructing or validating Result Schema values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A score or sub-score fell outside [0, 100].
    #[error("score {0} is out of range (expected 0..=100)")]
    ScoreOutOfRange(u8),

    /// A candidate identifier outside the closed set.
    #[error("unknown candidate id '{0}' (expected conservative, balanced, or aggressive)")]
    UnknownCandidateId(String),

    /// Candidate and score lists are not index-aligned.
    #[error("{candidates} candidates but {scores} scores; the lists must be index-aligned")]
    CandidateScoreMismatch {
        /// Number of candidates in the output.
        candidates: usize,
        /// Number of scores in the output.
        scores: usize,
    },

    /// The same candidate id appeared more than once.
    #[error("duplicate candidate id '{0}'")]
    DuplicateCandidate(CandidateId),
}

/// An integer score bounded to [0, 100].
///
/// Deserialization goes through the same check as [`Score::new`], so
/// out-of-range wire values are rejected rather than clamped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Largest representable score.
    pub const MAX: u8 = 100;

    /// Creates a score, rejecting values above 100.
    ///
    /// # Errors
    /// Returns `SchemaError::ScoreOutOfRange` for values above 100.
    pub fn new(value: u8) -> Result<Self, SchemaError> {
        if value > Self::MAX {
            return Err(SchemaError::ScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = SchemaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the three framing strategies a candidate thread takes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CandidateId {
    /// Safe framing, low controversy.
    Conservative,
    /// Middle-ground framing.
    Balanced,
    /// Provocative framing, engagement-bait leaning.
    Aggressive,
}

impl CandidateId {
    /// All identifiers, in their canonical order.
    pub const ALL: [CandidateId; 3] =
        [CandidateId::Conservative, CandidateId::Balanced, CandidateId::Aggressive];

    /// The lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CandidateId::Conservative => "conservative",
            CandidateId::Balanced => "balanced",
            CandidateId::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(CandidateId::Conservative),
            "balanced" => Ok(CandidateId::Balanced),
            "aggressive" => Ok(CandidateId::Aggressive),
            other => Err(SchemaError::UnknownCandidateId(other.to_string())),
        }
    }
}

/// Per-dimension virality sub-scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViralBreakdown {
    /// How strongly the opening grabs attention.
    pub hook: Score,
    /// How fresh the angle is.
    pub novelty: Score,
    /// How easy the thread is to follow.
    pub clarity: Score,
    /// How likely readers are to repost it.
    pub shareability: Score,
    /// How strongly it provokes replies.
    pub comment_bait: Score,
}

/// A structured virality assessment for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViralScore {
    /// Aggregate score in [0, 100].
    pub total: Score,
    /// Per-dimension sub-scores.
    pub breakdown: ViralBreakdown,
    /// Free-text justification for the numbers.
    pub rationale: String,
    /// Ordered improvement suggestions.
    pub improvements: Vec<String>,
}

/// One drafted thread, in one of the three framings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadCandidate {
    /// Which framing this candidate takes.
    pub id: CandidateId,
    /// Thread title or opening line.
    pub title: String,
    /// Ordered body segments (one per post).
    #[serde(default)]
    pub body: Vec<String>,
    /// Ordered meme references woven into the thread.
    #[serde(default)]
    pub memes: Vec<String>,
    /// Call to action closing the thread.
    pub cta: String,
    /// Target platform the draft is written for.
    pub platform: String,
}

/// The judge's verdict over the full candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Overall assessment of the candidate set.
    pub summary: String,
    /// What works across the candidates.
    pub strengths: Vec<String>,
    /// What falls flat.
    pub weaknesses: Vec<String>,
    /// Suggested rewrite per candidate id.
    pub rewrites: BTreeMap<CandidateId, String>,
    /// Which candidate to publish, and why.
    pub final_recommendation: String,
    /// Commentary on whether the scores hold up.
    pub score_review: String,
}

/// The three pass-through inputs a run is parameterized by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInputs {
    /// Subject to build threads around.
    pub topic: String,
    /// Platform the threads target (e.g., "Twitter").
    pub platform: String,
    /// Audience the threads are written for.
    pub target_audience: String,
}

impl RunInputs {
    /// Creates run inputs.
    #[must_use]
    pub fn new(
        topic: impl Into<String>,
        platform: impl Into<String>,
        target_audience: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            platform: platform.into(),
            target_audience: target_audience.into(),
        }
    }
}

/// The structured artifact one pipeline run produces.
///
/// `scores[i]` rates `candidates[i]`; construction rejects misaligned lists
/// and duplicate candidate ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalOutput {
    /// Verbatim run input.
    pub topic: String,
    /// Verbatim run input.
    pub target_audience: String,
    /// Verbatim run input.
    pub platform: String,
    /// The drafted candidates, in generation order.
    pub candidates: Vec<ThreadCandidate>,
    /// Index-aligned virality scores.
    pub scores: Vec<ViralScore>,
    /// The judge's verdict.
    pub review: Review,
}

impl FinalOutput {
    /// Assembles a run artifact, copying the inputs through verbatim.
    ///
    /// # Errors
    /// Returns `SchemaError` if candidates and scores differ in length or a
    /// candidate id repeats.
    pub fn new(
        inputs: &RunInputs,
        candidates: Vec<ThreadCandidate>,
        scores: Vec<ViralScore>,
        review: Review,
    ) -> Result<Self, SchemaError> {
        let output = Self {
            topic: inputs.topic.clone(),
            target_audience: inputs.target_audience.clone(),
            platform: inputs.platform.clone(),
            candidates,
            scores,
            review,
        };
        output.validate()?;
        Ok(output)
    }

    /// Re-checks the cross-field invariants, e.g. after deserializing.
    ///
    /// # Errors
    /// Returns `SchemaError` if candidates and scores differ in length or a
    /// candidate id repeats.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.candidates.len() != self.scores.len() {
            return Err(SchemaError::CandidateScoreMismatch {
                candidates: self.candidates.len(),
                scores: self.scores.len(),
            });
        }

        let mut seen: Vec<CandidateId> = Vec::with_capacity(self.candidates.len());
        for candidate in &self.candidates {
            if seen.contains(&candidate.id) {
                return Err(SchemaError::DuplicateCandidate(candidate.id));
            }
            seen.push(candidate.id);
        }

        Ok(())
    }
}
