use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Deadline stored for listings that are handed out without a queue.
pub const DIRECT_ALLOCATION: &str = "9999-99-99";

/// Number of ranks the portal publishes queue points for.
pub const QUEUE_RANKS: usize = 5;

/// Queue-point thresholds for ranks 1 through 5.
///
/// Ranks the portal does not show are zero. The length is part of the type,
/// so any sequence coming from outside goes through [`TryFrom`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePoints([i64; QUEUE_RANKS]);

impl QueuePoints {
    pub fn new(points: [i64; QUEUE_RANKS]) -> Self {
        Self(points)
    }

    /// Points needed for `rank`, counting from 1.
    pub fn rank(&self, rank: usize) -> Option<i64> {
        rank.checked_sub(1).and_then(|i| self.0.get(i).copied())
    }

    pub fn as_array(&self) -> &[i64; QUEUE_RANKS] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl From<[i64; QUEUE_RANKS]> for QueuePoints {
    fn from(points: [i64; QUEUE_RANKS]) -> Self {
        Self(points)
    }
}

impl TryFrom<&[i64]> for QueuePoints {
    type Error = Error;

    fn try_from(points: &[i64]) -> Result<Self> {
        <[i64; QUEUE_RANKS]>::try_from(points)
            .map(Self)
            .map_err(|_| Error::QueueLength(points.len()))
    }
}

impl TryFrom<Vec<i64>> for QueuePoints {
    type Error = Error;

    fn try_from(points: Vec<i64>) -> Result<Self> {
        Self::try_from(points.as_slice())
    }
}

/// Listing attributes only known right after a fetch. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetails {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub rent: i64,
    pub elevator: String,
    pub floor: i64,
}

/// A rental listing together with its interest queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    pub address: String,
    pub refid: String,
    pub size: f64,
    /// `YYYY-MM-DD`, or [`DIRECT_ALLOCATION`].
    pub deadline: String,
    pub applicants: i64,
    pub queue_points: QueuePoints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ListingDetails>,
}

impl Accommodation {
    pub fn new(
        address: impl Into<String>,
        refid: impl Into<String>,
        size: f64,
        deadline: impl Into<String>,
        applicants: i64,
        queue_points: QueuePoints,
    ) -> Self {
        Self {
            address: address.into(),
            refid: refid.into(),
            size,
            deadline: deadline.into(),
            applicants,
            queue_points,
            details: None,
        }
    }

    pub fn with_details(mut self, details: ListingDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// The persisted shape: same record without the fetch-only details.
    pub fn stored(&self) -> Self {
        Self {
            details: None,
            ..self.clone()
        }
    }

    pub fn is_direct_allocation(&self) -> bool {
        self.deadline == DIRECT_ALLOCATION
    }

    pub fn deadline_date(&self) -> Option<NaiveDate> {
        if self.is_direct_allocation() {
            return None;
        }
        NaiveDate::parse_from_str(&self.deadline, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Accommodation {
        Accommodation::new(
            "Storgatan 4.3",
            "abc",
            25.5,
            "2021-05-17",
            12,
            QueuePoints::new([34, 0, 7, 0, 0]),
        )
    }

    #[test]
    fn queue_points_require_five_entries() {
        assert!(matches!(
            QueuePoints::try_from(vec![1, 2, 3, 4]),
            Err(Error::QueueLength(4))
        ));
        assert!(matches!(
            QueuePoints::try_from(vec![1, 2, 3, 4, 5, 6]),
            Err(Error::QueueLength(6))
        ));

        let points = QueuePoints::try_from(vec![1, 2, 3, 4, 5]).unwrap();
        assert_eq!(points.as_array(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn rank_is_one_based() {
        let points = QueuePoints::new([10, 20, 30, 40, 50]);
        assert_eq!(points.rank(1), Some(10));
        assert_eq!(points.rank(5), Some(50));
        assert_eq!(points.rank(0), None);
        assert_eq!(points.rank(6), None);
    }

    #[test]
    fn deadline_date_handles_direct_allocation() {
        let acc = sample();
        assert_eq!(acc.deadline_date(), NaiveDate::from_ymd_opt(2021, 5, 17));
        assert!(!acc.is_direct_allocation());

        let direct = Accommodation {
            deadline: DIRECT_ALLOCATION.to_string(),
            ..sample()
        };
        assert!(direct.is_direct_allocation());
        assert_eq!(direct.deadline_date(), None);
    }

    #[test]
    fn stored_drops_details() {
        let details = ListingDetails {
            url: "https://example.test/abc".into(),
            kind: "Lägenhet".into(),
            location: "Ryd".into(),
            rent: 7250,
            elevator: "Ja".into(),
            floor: 3,
        };
        let fetched = sample().with_details(details);
        assert_ne!(fetched, sample());
        assert_eq!(fetched.stored(), sample());
    }

    #[test]
    fn serializes_without_absent_details() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["queue_points"], serde_json::json!([34, 0, 7, 0, 0]));
        assert!(json.get("details").is_none());
    }
}
