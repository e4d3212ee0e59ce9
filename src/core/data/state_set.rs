use std::fmt;

const WORD_BITS: usize = 64;

/// State Set: A fixed-capacity bit set of automaton state ids.
///
/// Two sets compare equal (and hash equally) iff they contain the same ids and share a capacity,
/// which makes them usable directly as keys when discovering subset-construction states.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct StateSet {
    words: Vec<u64>,
    capacity: usize,
}

impl StateSet {
    /// Returns an empty set able to hold ids in `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        StateSet {
            words: vec![0; (capacity + WORD_BITS - 1) / WORD_BITS],
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts `id`, returning true if it was not already present.
    pub fn insert(&mut self, id: usize) -> bool {
        assert!(id < self.capacity, "state id {} out of bounds", id);

        let (word, mask) = StateSet::locate(id);
        let absent = self.words[word] & mask == 0;
        self.words[word] |= mask;
        absent
    }

    pub fn contains(&self, id: usize) -> bool {
        if id >= self.capacity {
            return false;
        }

        let (word, mask) = StateSet::locate(id);
        self.words[word] & mask != 0
    }

    /// Adds every id in `other` to this set.
    pub fn union_with(&mut self, other: &StateSet) {
        for (word, other_word) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= *other_word;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    pub fn len(&self) -> usize {
        self.words
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    /// Returns an iterator over the ids in the set, in increasing order.
    pub fn iter(&self) -> StateSetIter {
        StateSetIter {
            set: self,
            word: 0,
            remaining: self.words.first().cloned().unwrap_or(0),
        }
    }

    fn locate(id: usize) -> (usize, u64) {
        (id / WORD_BITS, 1u64 << (id % WORD_BITS))
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub struct StateSetIter<'set> {
    set: &'set StateSet,
    word: usize,
    remaining: u64,
}

impl<'set> Iterator for StateSetIter<'set> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.remaining == 0 {
            self.word += 1;
            if self.word >= self.set.words.len() {
                return None;
            }
            self.remaining = self.set.words[self.word];
        }

        let bit = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(self.word * WORD_BITS + bit)
    }
}

impl<'set> IntoIterator for &'set StateSet {
    type Item = usize;
    type IntoIter = StateSetIter<'set>;

    fn into_iter(self) -> StateSetIter<'set> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_contains() {
        //setup
        let mut set = StateSet::with_capacity(200);

        //exercise
        let first = set.insert(3);
        let again = set.insert(3);
        set.insert(64);
        set.insert(199);

        //verify
        assert!(first);
        assert!(!again);
        assert!(set.contains(3));
        assert!(set.contains(64));
        assert!(set.contains(199));
        assert!(!set.contains(4));
        assert!(!set.contains(500));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn iter_ordered() {
        //setup
        let mut set = StateSet::with_capacity(150);
        for id in &[130, 0, 63, 64, 7] {
            set.insert(*id);
        }

        //exercise
        let ids: Vec<usize> = set.iter().collect();

        //verify
        assert_eq!(ids, vec![0, 7, 63, 64, 130]);
    }

    #[test]
    fn union_equality() {
        //setup
        let mut left = StateSet::with_capacity(10);
        left.insert(1);
        left.insert(2);
        let mut right = StateSet::with_capacity(10);
        right.insert(2);
        right.insert(5);

        let mut expected = StateSet::with_capacity(10);
        for id in &[1, 2, 5] {
            expected.insert(*id);
        }

        //exercise
        left.union_with(&right);

        //verify
        assert_eq!(left, expected);
        assert_eq!(format!("{:?}", left), "{1, 2, 5}");
    }

    #[test]
    fn empty() {
        //setup
        let set = StateSet::with_capacity(0);

        //exercise/verify
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        assert_eq!(set.len(), 0);
    }
}
