//! Shared top-N truncation for count-based views.
//!
//! Every chart type shows at most [`MAX_CATEGORIES`] bars/slices/points;
//! beyond that, the tail is collapsed into a synthetic `"Other"` row. One
//! function, used by every count-shaped view - the rule is identical across
//! chart types on purpose.

use super::views::CountRow;

/// Maximum number of rows a count view may carry.
pub const MAX_CATEGORIES: usize = 20;

/// Label of the synthetic row holding the collapsed tail.
pub const OTHER_LABEL: &str = "Other";

/// Collapse a descending-sorted count table to at most `limit` rows.
///
/// With more than `limit` rows, the `limit - 1` highest survive and the rest
/// are summed under [`OTHER_LABEL`]. With `limit` rows or fewer the input is
/// returned unchanged (identity law). Ties at the boundary are already
/// settled by the caller's ordering: counts arrive stably sorted, so
/// equal-count labels keep their first-seen table order.
pub fn truncate(counts: Vec<CountRow>, limit: usize) -> Vec<CountRow> {
    if limit == 0 || counts.len() <= limit {
        return counts;
    }
    let mut iter = counts.into_iter();
    let mut kept: Vec<CountRow> = iter.by_ref().take(limit - 1).collect();
    let other: u64 = iter.map(|row| row.count).sum();
    kept.push(CountRow {
        label: OTHER_LABEL.to_string(),
        count: other,
    });
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<CountRow> {
        (0..n)
            .map(|i| CountRow {
                label: format!("cat{i}"),
                count: (n - i) as u64,
            })
            .collect()
    }

    #[test]
    fn test_identity_below_limit() {
        let input = rows(20);
        assert_eq!(truncate(input.clone(), MAX_CATEGORIES), input);
        let input = rows(3);
        assert_eq!(truncate(input.clone(), MAX_CATEGORIES), input);
    }

    #[test]
    fn test_truncates_to_19_plus_other() {
        let out = truncate(rows(25), MAX_CATEGORIES);
        assert_eq!(out.len(), 20);
        assert_eq!(out[18].label, "cat18");
        assert_eq!(out.last().unwrap().label, OTHER_LABEL);
        // counts 25..=1; tail is rows 19..24 with counts 6..=1
        assert_eq!(out.last().unwrap().count, 6 + 5 + 4 + 3 + 2 + 1);
    }

    #[test]
    fn test_other_sum_matches_total() {
        let input = rows(40);
        let total: u64 = input.iter().map(|r| r.count).sum();
        let out = truncate(input, MAX_CATEGORIES);
        let out_total: u64 = out.iter().map(|r| r.count).sum();
        assert_eq!(total, out_total);
    }

    #[test]
    fn test_zero_limit_is_identity() {
        let input = rows(5);
        assert_eq!(truncate(input.clone(), 0), input);
    }
}
