/// Disjoint-set forest with union by rank and path halving.
///
/// Elements are dense indexes `0..n`; the structure is used to gather
/// hydrogen-bonded β strands into sheets.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Creates a forest of `n` singleton sets
    pub fn new(n: usize) -> UnionFind {
        UnionFind { parent: (0..n).collect(), rank: vec![0; n] }
    }

    /// The number of elements in this forest
    pub fn len(&self) -> usize { self.parent.len() }

    pub fn is_empty(&self) -> bool { self.parent.is_empty() }

    /// Makes every element a singleton set again
    pub fn disconnect(&mut self) {
        for (i, p) in self.parent.iter_mut().enumerate() { *p = i; }
        for r in self.rank.iter_mut() { *r = 0; }
    }

    /// Finds the representative of the set a given element belongs to
    pub fn find_set(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets holding the two given elements
    pub fn union_set(&mut self, a: usize, b: usize) {
        let ra = self.find_set(a);
        let rb = self.find_set(b);
        if ra == rb { return; }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
    }

    /// True when both elements belong to the same set
    pub fn same_set(&mut self, a: usize, b: usize) -> bool { self.find_set(a) == self.find_set(b) }

    /// Counts the disjoint sets
    pub fn count_sets(&mut self) -> usize {
        (0..self.len()).filter(|&i| self.find_set(i) == i).count()
    }
}
