//! Opcode alignment of two exchanger sequences.
//!
//! Matches are found with a longest-common-subsequence table; the gaps
//! between matched runs become insert, delete or replace opcodes.

use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpTag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// `from[a]` is turned into `to[b]` by `tag`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub a: Range<usize>,
    pub b: Range<usize>,
}

pub fn opcodes<T: PartialEq>(from: &[T], to: &[T]) -> Vec<Opcode> {
    let (n, m) = (from.len(), to.len());
    // lcs[i][j] = LCS length of from[i..] and to[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if from[i] == to[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut matches = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if from[i] == to[j] {
            matches.push((i, j));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    // sentinel closes the trailing gap
    matches.push((n, m));

    let mut codes: Vec<Opcode> = Vec::new();
    let (mut i, mut j) = (0, 0);
    for (mi, mj) in matches {
        let tag = match (i < mi, j < mj) {
            (true, true) => Some(OpTag::Replace),
            (true, false) => Some(OpTag::Delete),
            (false, true) => Some(OpTag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            codes.push(Opcode { tag, a: i..mi, b: j..mj });
        }
        if mi < n && mj < m {
            match codes.last_mut() {
                Some(last) if last.tag == OpTag::Equal && last.a.end == mi && last.b.end == mj => {
                    last.a.end += 1;
                    last.b.end += 1;
                }
                _ => codes.push(Opcode {
                    tag: OpTag::Equal,
                    a: mi..mi + 1,
                    b: mj..mj + 1,
                }),
            }
        }
        i = mi + 1;
        j = mj + 1;
    }
    codes
}
