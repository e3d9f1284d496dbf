//! Myers shortest-edit-script line diff
//!
//! Produces the edit script between two sequences and, for the stat
//! pipeline, the insertion/deletion counts between two text contents.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Delete { value: T },
    Insert { value: T },
    Equal { value: T },
}

impl<T> Edit<T>
where
    T: Clone + Into<String>,
{
    pub fn as_string(&self) -> String {
        match self {
            Edit::Delete { value } => format!("-{}", value.clone().into()),
            Edit::Insert { value } => format!("+{}", value.clone().into()),
            Edit::Equal { value } => format!(" {}", value.clone().into()),
        }
    }
}

impl<T> Display for Edit<T>
where
    T: Clone + Into<String>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// Compute the shortest edit script from `a` to `b`
pub fn diff<T: Eq + Clone>(a: &[T], b: &[T]) -> Vec<Edit<T>> {
    // the trace offset math needs at least one element on some side
    if a.is_empty() && b.is_empty() {
        return Vec::new();
    }

    let path = backtrack(a, b);
    let mut edits = Vec::new();

    for (prev_x, prev_y, x, y) in path {
        if x == prev_x {
            // only y advanced: insertion
            if prev_y < b.len() as isize {
                edits.push(Edit::Insert {
                    value: b[prev_y as usize].clone(),
                });
            }
        } else if y == prev_y {
            // only x advanced: deletion
            if prev_x < a.len() as isize {
                edits.push(Edit::Delete {
                    value: a[prev_x as usize].clone(),
                });
            }
        } else if prev_x < a.len() as isize {
            // diagonal: both advanced
            edits.push(Edit::Equal {
                value: a[prev_x as usize].clone(),
            });
        }
    }

    edits.reverse();
    edits
}

/// Insertions and deletions between two text contents, line-based
///
/// A missing diff side is handed in as empty content, so a new file counts
/// all its lines as insertions and a deleted file all its lines as
/// deletions.
pub fn line_diff_counts(old: &str, new: &str) -> (usize, usize) {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let mut insertions = 0;
    let mut deletions = 0;
    for edit in diff(&old_lines, &new_lines) {
        match edit {
            Edit::Insert { .. } => insertions += 1,
            Edit::Delete { .. } => deletions += 1,
            Edit::Equal { .. } => {}
        }
    }

    (insertions, deletions)
}

fn shortest_edit_trace<T: Eq>(a: &[T], b: &[T]) -> Vec<Vec<isize>> {
    let (n, m) = (a.len() as isize, b.len() as isize);
    let offset = (n + m) as usize;

    let mut v = vec![0; 2 * offset + 1];
    let mut trace = Vec::new();

    for d in 0..=(n + m) {
        trace.push(v.clone());

        for k in (-d..=d).step_by(2) {
            let idx = (offset as isize + k) as usize;

            let mut x = if k == -d {
                // we could have only come from k+1, thus an insertion
                v[idx + 1]
            } else if k == d {
                // we could have only come from k-1, thus a deletion
                v[idx - 1] + 1
            } else {
                // best of deletion from k-1 or insertion from k+1
                let x_del = v[idx - 1] + 1;
                let x_ins = v[idx + 1];
                if x_del > x_ins { x_del } else { x_ins }
            };

            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                // snake
                x += 1;
                y += 1;
            }

            v[idx] = x;

            if x >= n && y >= m {
                return trace;
            }
        }
    }

    trace
}

fn backtrack<T: Eq>(a: &[T], b: &[T]) -> Vec<(isize, isize, isize, isize)> {
    let (mut x, mut y) = (a.len() as isize, b.len() as isize);
    let offset = (x + y) as usize;
    let mut edit_path = Vec::new();

    let trace = shortest_edit_trace(a, b);

    for (d, v) in trace.iter().enumerate().rev() {
        let k = x - y;

        let prev_k = if k == -(d as isize) {
            k + 1
        } else if k == (d as isize) {
            k - 1
        } else {
            let k_del = k - 1;
            let k_ins = k + 1;
            if v[(offset as isize + k_del) as usize] + 1 > v[(offset as isize + k_ins) as usize] {
                k_del
            } else {
                k_ins
            }
        };

        let prev_x = v[(offset as isize + prev_k) as usize];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            edit_path.push((x - 1, y - 1, x, y));
            x -= 1;
            y -= 1;
        }

        if d > 0 {
            edit_path.push((prev_x, prev_y, x, y));
        }

        (x, y) = (prev_x, prev_y);
    }

    edit_path
}
