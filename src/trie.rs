use std::collections::HashMap;

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    /// The complete word ending at this node, if any.
    word: Option<String>,
}

/// Prefix tree over account names.
///
/// `find` returns matches in no particular order; callers that need sorted
/// output sort the result themselves.
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserting a word twice is a no-op.
    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if node.word.is_none() {
            node.word = Some(word.to_string());
            self.len += 1;
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.descend(word).is_some_and(|node| node.word.is_some())
    }

    /// Every inserted word that starts with `prefix`. `find("")` returns all.
    pub fn find(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        if let Some(node) = self.descend(prefix) {
            collect(node, &mut results);
        }
        results
    }

    /// Like `find`, but `prefix` is matched without regard to case.
    pub fn find_ignore_case(&self, prefix: &str) -> Vec<String> {
        let mut frontier = vec![&self.root];
        for p in prefix.chars() {
            frontier = frontier
                .into_iter()
                .flat_map(|node| node.children.iter())
                .filter(|(c, _)| c.to_lowercase().eq(p.to_lowercase()))
                .map(|(_, child)| child)
                .collect();
            if frontier.is_empty() {
                return Vec::new();
            }
        }
        let mut results = Vec::new();
        for node in frontier {
            collect(node, &mut results);
        }
        results
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn descend(&self, prefix: &str) -> Option<&TrieNode> {
        prefix
            .chars()
            .try_fold(&self.root, |node, c| node.children.get(&c))
    }
}

fn collect<'a>(start: &'a TrieNode, results: &mut Vec<String>) {
    let mut stack: Vec<&'a TrieNode> = vec![start];
    while let Some(node) = stack.pop() {
        if let Some(word) = &node.word {
            results.push(word.clone());
        }
        stack.extend(node.children.values());
    }
}

impl<'a> FromIterator<&'a str> for Trie {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut trie = Trie::new();
        for word in iter {
            trie.insert(word);
        }
        trie
    }
}
