//! Ranking-position buckets for distribution charts.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Top3,
    Top10,
    Top20,
    Beyond20,
}

/// `(bucket, min, max)`, inclusive on both ends, checked in order.
const BUCKET_RANGES: [(Bucket, i64, i64); 4] = [
    (Bucket::Top3, 1, 3),
    (Bucket::Top10, 4, 10),
    (Bucket::Top20, 11, 20),
    (Bucket::Beyond20, 21, i64::MAX),
];

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Top3, Bucket::Top10, Bucket::Top20, Bucket::Beyond20];

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Top3 => "Top 3",
            Bucket::Top10 => "4-10",
            Bucket::Top20 => "11-20",
            Bucket::Beyond20 => "20+",
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

/// Bucket for a ranking position, or `None` for positions outside every range.
///
/// Positions are averages, so they are rounded to the nearest whole rank
/// first. Non-finite values and anything below rank 1 match nothing.
pub fn bucket(position: f64) -> Option<Bucket> {
    if !position.is_finite() {
        return None;
    }
    let rank = position.round();
    if rank < 1.0 {
        return None;
    }
    // Float-to-int casts saturate, so huge positions land in the last bucket.
    let rank = rank as i64;
    BUCKET_RANGES
        .iter()
        .find(|(_, min, max)| rank >= *min && rank <= *max)
        .map(|(b, _, _)| *b)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: Bucket,
    pub count: usize,
}

/// Count positions per bucket. Every bucket is present, in rank order.
pub fn position_distribution<I>(positions: I) -> Vec<BucketCount>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut counts = [0usize; 4];
    for b in positions.into_iter().flatten().filter_map(bucket) {
        counts[b as usize] += 1;
    }
    Bucket::ALL
        .into_iter()
        .zip(counts)
        .map(|(bucket, count)| BucketCount { bucket, count })
        .collect()
}

/// One distribution per category label, sorted by label.
///
/// Same buckets as [`position_distribution`], applied to each category's own
/// keyword population.
pub fn category_distribution<'a, I>(rows: I) -> BTreeMap<String, Vec<BucketCount>>
where
    I: IntoIterator<Item = (&'a str, Option<f64>)>,
{
    let mut grouped: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for (category, position) in rows {
        grouped
            .entry(category.to_string())
            .or_default()
            .push(position);
    }
    grouped
        .into_iter()
        .map(|(category, positions)| (category, position_distribution(positions)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges() {
        assert_eq!(bucket(1.0), Some(Bucket::Top3));
        assert_eq!(bucket(3.0), Some(Bucket::Top3));
        assert_eq!(bucket(4.0), Some(Bucket::Top10));
        assert_eq!(bucket(10.0), Some(Bucket::Top10));
        assert_eq!(bucket(11.0), Some(Bucket::Top20));
        assert_eq!(bucket(20.0), Some(Bucket::Top20));
        assert_eq!(bucket(21.0), Some(Bucket::Beyond20));
        assert_eq!(bucket(98.0), Some(Bucket::Beyond20));
    }

    #[test]
    fn non_numeric_positions_have_no_bucket() {
        assert_eq!(bucket(f64::NAN), None);
        assert_eq!(bucket(f64::INFINITY), None);
        assert_eq!(bucket(0.0), None);
        assert_eq!(bucket(-4.0), None);
    }

    #[test]
    fn fractional_positions_round_to_nearest_rank() {
        assert_eq!(bucket(3.4), Some(Bucket::Top3));
        assert_eq!(bucket(3.5), Some(Bucket::Top10));
        assert_eq!(bucket(20.4), Some(Bucket::Top20));
        assert_eq!(bucket(0.7), Some(Bucket::Top3));
    }

    #[test]
    fn labels_match_chart_legend() {
        let labels: Vec<&str> = Bucket::ALL.iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["Top 3", "4-10", "11-20", "20+"]);
        assert_eq!(
            serde_json::to_value(Bucket::Beyond20).expect("serialize"),
            "20+"
        );
    }

    #[test]
    fn distribution_skips_missing_positions() {
        let dist = position_distribution([Some(1.0), None, Some(2.0), Some(15.0), Some(f64::NAN)]);
        let counts: Vec<usize> = dist.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![2, 0, 1, 0]);
    }

    #[test]
    fn category_distribution_groups_by_label() {
        let dist = category_distribution([
            ("Shoes", Some(2.0)),
            ("Bags", Some(30.0)),
            ("Shoes", Some(7.0)),
        ]);
        assert_eq!(dist.len(), 2);
        let shoes: Vec<usize> = dist["Shoes"].iter().map(|c| c.count).collect();
        assert_eq!(shoes, vec![1, 1, 0, 0]);
        let bags: Vec<usize> = dist["Bags"].iter().map(|c| c.count).collect();
        assert_eq!(bags, vec![0, 0, 0, 1]);
    }
}
