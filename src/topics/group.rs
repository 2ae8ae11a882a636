// Noun groups: the mutable state of one grouping run.
//
// Groups live in a Vec in creation order, which doubles as the first-seen
// tie-break everywhere: ranking, taxonomic and similarity placement all
// iterate groups in this order and only replace a candidate on a strictly
// better score.

use std::collections::{HashMap, HashSet};

/// Index of a group within its GroupSet (creation order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

/// Word counts that remember the order words were first seen in.
#[derive(Debug, Clone, Default)]
pub struct WordTally {
    counts: HashMap<String, (u64, usize)>,
    next_seen: usize,
}

impl WordTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` occurrences of `word`.
    pub fn add(&mut self, word: &str, n: u64) {
        if let Some((count, _)) = self.counts.get_mut(word) {
            *count += n;
            return;
        }
        self.counts.insert(word.to_string(), (n, self.next_seen));
        self.next_seen += 1;
    }

    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).map(|(c, _)| *c).unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|(c, _)| c).sum()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in first-seen order.
    pub fn in_first_seen_order(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(&String, &(u64, usize))> = self.counts.iter().collect();
        entries.sort_by_key(|(_, (_, seen))| *seen);
        entries
            .into_iter()
            .map(|(w, (c, _))| (w.clone(), *c))
            .collect()
    }

    /// Entries by count descending, ties broken by first-seen order.
    pub fn ranked(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(&String, &(u64, usize))> = self.counts.iter().collect();
        entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        entries
            .into_iter()
            .map(|(w, (c, _))| (w.clone(), *c))
            .collect()
    }
}

/// A cluster of related noun lemmas and the words seen around them.
#[derive(Debug, Clone)]
pub struct NounGroup {
    pub id: GroupId,
    /// The noun the group was created for; compared against by later nouns
    pub head: String,
    /// Member noun -> occurrence count
    pub members: WordTally,
    /// Context word -> occurrence count
    pub context: WordTally,
    /// Words that map straight into this group (user-defined seed groups)
    pub aliases: HashSet<String>,
    /// Head unknown to both the taxonomy and the similarity model
    pub possibly_misspelled: bool,
}

impl NounGroup {
    /// Derived group identifier, distinct from any raw token.
    pub fn label(&self) -> String {
        format!("_{}", self.head)
    }

    /// Total member occurrences.
    pub fn total(&self) -> u64 {
        self.members.total()
    }

    pub fn is_seed(&self) -> bool {
        !self.aliases.is_empty()
    }
}

/// All groups of one run, plus the noun -> group index.
#[derive(Debug, Clone, Default)]
pub struct GroupSet {
    groups: Vec<NounGroup>,
    by_noun: HashMap<String, GroupId>,
}

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty group headed by `head`.
    pub fn create(&mut self, head: &str, possibly_misspelled: bool) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(NounGroup {
            id,
            head: head.to_string(),
            members: WordTally::new(),
            context: WordTally::new(),
            aliases: HashSet::new(),
            possibly_misspelled,
        });
        id
    }

    /// Create a seed group that directly claims its root and aliases.
    pub fn create_seed(&mut self, root: &str, aliases: &[String]) -> GroupId {
        let id = self.create(root, false);
        let group = &mut self.groups[id.0];
        group.aliases.insert(root.to_string());
        group.aliases.extend(aliases.iter().cloned());
        id
    }

    /// Add a noun's occurrences to a group and record the membership.
    pub fn absorb(&mut self, id: GroupId, noun: &str, count: u64) {
        self.groups[id.0].members.add(noun, count);
        self.by_noun.insert(noun.to_string(), id);
    }

    pub fn group_of(&self, noun: &str) -> Option<GroupId> {
        self.by_noun.get(noun).copied()
    }

    pub fn get(&self, id: GroupId) -> &NounGroup {
        &self.groups[id.0]
    }

    pub fn get_mut(&mut self, id: GroupId) -> &mut NounGroup {
        &mut self.groups[id.0]
    }

    /// Groups in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &NounGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
