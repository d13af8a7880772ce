//! Range partitioning of a date interval into equal-width buckets
//!
//! The bucket of a row is a pure function of its day number, the query's
//! date range and the coordinator count. Every coordinator computes it
//! independently and must agree with every other one, so nothing here may
//! depend on local state.

use chrono::NaiveDate;

use super::errors::{CoordinatorError, CoordinatorResult};
use crate::model::{day_number, Row};

/// Equal-width partition of an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBuckets {
    first_day: i64,
    span: i64,
    buckets: usize,
}

/// Per-peer runs of a date-sorted row array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendShape {
    /// Rows destined for peer `i`
    pub counts: Vec<usize>,
    /// Index in the sorted array where peer `i`'s run begins
    pub offsets: Vec<usize>,
}

impl SendShape {
    /// Total rows that leave this coordinator (in-range rows only)
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl DateBuckets {
    /// Partition `start..=end` into `buckets` contiguous ranges.
    pub fn new(start: NaiveDate, end: NaiveDate, buckets: usize) -> CoordinatorResult<Self> {
        if buckets == 0 {
            return Err(CoordinatorError::protocol_violation(
                "cannot partition a date range into zero buckets",
            ));
        }
        if start > end {
            return Err(CoordinatorError::protocol_violation(format!(
                "date range {}..={} is inverted",
                start, end
            )));
        }

        let first_day = day_number(start);
        Ok(Self {
            first_day,
            span: day_number(end) - first_day + 1,
            buckets,
        })
    }

    /// Number of buckets
    pub fn count(&self) -> usize {
        self.buckets
    }

    /// Bucket of a day number, or `None` outside the range.
    ///
    /// Bucket `i` covers day offsets `[i * span / P, (i + 1) * span / P)`
    /// in exact integer arithmetic, so bucket boundaries never depend on
    /// floating-point rounding.
    pub fn bucket_of_day(&self, day: i64) -> Option<usize> {
        let offset = day - self.first_day;
        if offset < 0 || offset >= self.span {
            return None;
        }
        let bucket = (i128::from(offset) * self.buckets as i128) / i128::from(self.span);
        Some(bucket as usize)
    }

    /// Bucket of a row's sale date
    pub fn bucket_of(&self, row: &Row) -> Option<usize> {
        self.bucket_of_day(row.day_number())
    }

    /// Split date-sorted rows into one contiguous run per bucket.
    ///
    /// Rows outside the range belong to no bucket and are never sent. Since
    /// the rows are sorted, in-range rows form one contiguous block and each
    /// bucket's rows form a contiguous run inside it, in bucket order.
    pub fn send_shape(&self, sorted: &[Row]) -> SendShape {
        let mut counts = vec![0usize; self.buckets];
        let mut first_in_range = None;

        for (index, row) in sorted.iter().enumerate() {
            if let Some(bucket) = self.bucket_of(row) {
                counts[bucket] += 1;
                first_in_range.get_or_insert(index);
            }
        }

        let mut offsets = Vec::with_capacity(self.buckets);
        let mut next = first_in_range.unwrap_or(sorted.len());
        for count in &counts {
            offsets.push(next);
            next += count;
        }

        SendShape { counts, offsets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(d: NaiveDate) -> Row {
        Row::new(1, d, 1.0)
    }

    #[test]
    fn test_buckets_cover_range_in_order() {
        let buckets = DateBuckets::new(date(2021, 1, 1), date(2021, 1, 10), 3).unwrap();
        let assigned: Vec<usize> = (1..=10)
            .map(|d| buckets.bucket_of(&row(date(2021, 1, d))).unwrap())
            .collect();
        assert_eq!(assigned, vec![0, 0, 0, 0, 1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_bucket_index_is_monotonic_in_date() {
        let buckets = DateBuckets::new(date(2020, 1, 1), date(2020, 12, 31), 7).unwrap();
        let mut previous = 0;
        let mut day = date(2020, 1, 1);
        while day <= date(2020, 12, 31) {
            let bucket = buckets.bucket_of(&row(day)).unwrap();
            assert!(bucket >= previous);
            assert!(bucket < 7);
            previous = bucket;
            day = day.succ_opt().unwrap();
        }
        assert_eq!(previous, 6);
    }

    #[test]
    fn test_out_of_range_has_no_bucket() {
        let buckets = DateBuckets::new(date(2021, 1, 1), date(2021, 1, 31), 2).unwrap();
        assert_eq!(buckets.bucket_of(&row(date(2020, 12, 31))), None);
        assert_eq!(buckets.bucket_of(&row(date(2021, 2, 1))), None);
        assert_eq!(buckets.bucket_of(&row(date(2021, 1, 31))), Some(1));
    }

    #[test]
    fn test_more_buckets_than_days() {
        let buckets = DateBuckets::new(date(2021, 1, 1), date(2021, 1, 2), 5).unwrap();
        assert_eq!(buckets.bucket_of(&row(date(2021, 1, 1))), Some(0));
        assert_eq!(buckets.bucket_of(&row(date(2021, 1, 2))), Some(2));
    }

    #[test]
    fn test_send_shape_skips_out_of_range_rows() {
        let buckets = DateBuckets::new(date(2021, 1, 1), date(2021, 1, 10), 2).unwrap();
        let sorted = vec![
            row(date(2020, 12, 30)),
            row(date(2021, 1, 2)),
            row(date(2021, 1, 3)),
            row(date(2021, 1, 8)),
            row(date(2021, 2, 1)),
        ];
        let shape = buckets.send_shape(&sorted);
        assert_eq!(shape.counts, vec![2, 1]);
        assert_eq!(shape.offsets, vec![1, 3]);
        assert_eq!(shape.total(), 3);
    }

    #[test]
    fn test_send_shape_of_empty_input() {
        let buckets = DateBuckets::new(date(2021, 1, 1), date(2021, 1, 10), 3).unwrap();
        let shape = buckets.send_shape(&[]);
        assert_eq!(shape.counts, vec![0, 0, 0]);
        assert_eq!(shape.offsets, vec![0, 0, 0]);
    }

    #[test]
    fn test_invalid_partitions_rejected() {
        assert!(DateBuckets::new(date(2021, 1, 2), date(2021, 1, 1), 2).is_err());
        assert!(DateBuckets::new(date(2021, 1, 1), date(2021, 1, 2), 0).is_err());
    }
}
