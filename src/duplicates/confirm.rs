//! Byte-exact confirmation of digest buckets.
//!
//! Digest equality only nominates candidates. Every file in a digest bucket is
//! streamed against the representative of each equivalence class found so far
//! and joined to the first class it matches exactly; files are merged with a
//! disjoint-set forest. In the common case (all members identical) a bucket of
//! `n` files costs `n - 1` comparisons.

use std::collections::HashMap;

use crate::scanner::{FileEntry, HashError, Hasher};

/// Union-find over `0..n` with path halving and union by rank.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Create `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Representative of the set containing `x`.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets containing `a` and `b`. Returns false if already merged.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    /// Whether `a` and `b` are in the same set.
    pub fn same(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}

/// Outcome of confirming one digest bucket.
#[derive(Debug, Default)]
pub struct Confirmation {
    /// Equivalence classes with 2+ members, each in discovery order, ordered
    /// by their first member
    pub classes: Vec<Vec<FileEntry>>,
    /// Files that could not be read during comparison
    pub failures: Vec<HashError>,
    /// Extra distinct contents found behind one digest
    pub collisions: usize,
    /// Pairwise comparisons performed
    pub comparisons: usize,
}

/// Split a digest bucket into classes of byte-identical files.
///
/// A file that cannot be read is dropped from every class and reported in
/// [`Confirmation::failures`]. When a class representative fails, another
/// live member of that class takes its place.
///
/// # Errors
///
/// Returns [`HashError::Interrupted`] if cancellation is requested; no
/// partial classes are returned.
pub fn partition_identical(
    mut files: Vec<FileEntry>,
    hasher: &Hasher,
) -> Result<Confirmation, HashError> {
    files.sort_by_key(|f| f.index);

    let n = files.len();
    let mut sets = DisjointSet::new(n);
    let mut failed = vec![false; n];
    let mut reps: Vec<usize> = Vec::new();
    let mut outcome = Confirmation::default();

    for i in 0..n {
        let mut placed = false;
        let mut r = 0;

        while r < reps.len() {
            let rep = reps[r];
            outcome.comparisons += 1;

            match hasher.contents_equal(&files[rep].path, &files[i].path) {
                Ok(true) => {
                    sets.union(rep, i);
                    placed = true;
                    break;
                }
                Ok(false) => {
                    log::debug!(
                        "Digest collision: {} differs from {}",
                        files[i].path.display(),
                        files[rep].path.display()
                    );
                    r += 1;
                }
                Err(HashError::Interrupted) => return Err(HashError::Interrupted),
                Err(e) if e.path() == Some(files[i].path.as_path()) => {
                    log::warn!("Skipping {}: {}", files[i].path.display(), e);
                    failed[i] = true;
                    outcome.failures.push(e);
                    placed = true;
                    break;
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", files[rep].path.display(), e);
                    failed[rep] = true;
                    outcome.failures.push(e);

                    // Retry the same slot with a surviving member of the class
                    match (0..i).find(|&j| !failed[j] && sets.same(j, rep)) {
                        Some(substitute) => reps[r] = substitute,
                        None => {
                            reps.remove(r);
                        }
                    }
                }
            }
        }

        if !placed {
            reps.push(i);
        }
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut classes: Vec<Vec<FileEntry>> = Vec::new();
    for (i, file) in files.into_iter().enumerate() {
        if failed[i] {
            continue;
        }
        let root = sets.find(i);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            classes.push(Vec::new());
            classes.len() - 1
        });
        classes[slot].push(file);
    }

    outcome.collisions = classes.len().saturating_sub(1);
    outcome.classes = classes.into_iter().filter(|c| c.len() >= 2).collect();
    Ok(outcome)
}
