//! Anchor computation: the matching index pairs a diff is built around.

use similar::{capture_diff_slices, Algorithm, DiffOp};

/// A matched pair `(index in a, index in b)`, 0-based.
pub type Anchor = (usize, usize);

/// Longest common subsequence of `a` and `b` as an ordered list of anchors.
///
/// Fills an `(n+1)×(m+1)` table of prefix LCS lengths and walks
/// back from `[n][m]`: equal lines step diagonally, otherwise the walk moves
/// up when `dp[i-1][j] >= dp[i][j-1]` and left when not.
pub fn lcs_anchors<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Anchor> {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let width = m + 1;
    let mut dp = vec![0u32; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            dp[i * width + j] = if a[i - 1] == b[j - 1] {
                dp[(i - 1) * width + (j - 1)] + 1
            } else {
                dp[(i - 1) * width + j].max(dp[i * width + (j - 1)])
            };
        }
    }

    let mut anchors = Vec::with_capacity(dp[n * width + m] as usize);
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            anchors.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if dp[(i - 1) * width + j] >= dp[i * width + (j - 1)] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    anchors.reverse();
    anchors
}

/// Anchors taken from the equal runs of an O(ND) Myers diff.
///
/// Not guaranteed to be a longest common subsequence, but always a valid
/// strictly increasing matching.
pub fn myers_anchors(a: &[String], b: &[String]) -> Vec<Anchor> {
    capture_diff_slices(Algorithm::Myers, a, b)
        .into_iter()
        .flat_map(|op| match op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => (0..len)
                .map(|k| (old_index + k, new_index + k))
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        })
        .collect()
}
