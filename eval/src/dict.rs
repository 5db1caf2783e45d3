//! Character-indexed prefix trie used for all symbol tables.

use hashbrown::HashMap;

use core::mem;

use crate::error::DictError;

/// Prefix trie mapping character sequences to payloads.
///
/// The same structure backs every symbol table of an
/// [`Environment`](crate::Environment): variables, prefix operators,
/// functions, infix operators and suffix operators. Besides the usual
/// key-value operations it supports [longest-match lookup](Self::find_longest)
/// at an arbitrary position of a source string, which is what lets the parser
/// recognize overlapping tokens (`-`, `-=`, `->`) in a single forward pass
/// without backtracking.
///
/// # Examples
///
/// ```
/// use expression_eval::SymbolDict;
///
/// let mut dict = SymbolDict::new();
/// dict.insert("sin", 1)?;
/// dict.insert("sinh", 2)?;
///
/// // `sinc` is not a key; the lookup falls back to the longest
/// // payload-bearing prefix.
/// assert_eq!(dict.find_longest("sinc(x)", 0), Some((&1, 3)));
/// assert_eq!(dict.find_longest("sinh(x)", 0), Some((&2, 4)));
/// assert_eq!(dict.find_longest("cos(x)", 0), None);
/// # Ok::<_, expression_eval::DictError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SymbolDict<P> {
    root: Node<P>,
    len: usize,
}

#[derive(Debug, Clone)]
struct Node<P> {
    payload: Option<P>,
    children: HashMap<char, Node<P>>,
}

impl<P> Default for Node<P> {
    fn default() -> Self {
        Self {
            payload: None,
            children: HashMap::new(),
        }
    }
}

impl<P> Default for SymbolDict<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> SymbolDict<P> {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }

    /// Returns the number of payload-bearing keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks whether the dictionary contains no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Attaches `payload` to the node reached by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Duplicate`] if the key already carries a payload;
    /// the dictionary is left unchanged in that case apart from possibly
    /// extended (still payload-free) interior nodes.
    pub fn insert(&mut self, key: &str, payload: P) -> Result<(), DictError> {
        let mut node = &mut self.root;
        for ch in key.chars() {
            node = node.children.entry(ch).or_default();
        }
        if node.payload.is_some() {
            return Err(DictError::Duplicate);
        }
        node.payload = Some(payload);
        self.len += 1;
        Ok(())
    }

    /// Replaces the payload of an existing key, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Missing`] if the key carries no payload.
    pub fn replace(&mut self, key: &str, payload: P) -> Result<P, DictError> {
        let mut node = &mut self.root;
        for ch in key.chars() {
            node = node.children.get_mut(&ch).ok_or(DictError::Missing)?;
        }
        match &mut node.payload {
            Some(slot) => Ok(mem::replace(slot, payload)),
            None => Err(DictError::Missing),
        }
    }

    /// Removes the payload at `key` and prunes the trailing chain of nodes
    /// that neither carry a payload nor have other children.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Missing`] if the key carries no payload.
    pub fn remove(&mut self, key: &str) -> Result<P, DictError> {
        fn recurse<P>(
            node: &mut Node<P>,
            mut chars: core::str::Chars<'_>,
        ) -> Result<(P, bool), DictError> {
            match chars.next() {
                None => {
                    let payload = node.payload.take().ok_or(DictError::Missing)?;
                    Ok((payload, node.children.is_empty()))
                }
                Some(ch) => {
                    let child = node.children.get_mut(&ch).ok_or(DictError::Missing)?;
                    let (payload, prune) = recurse(child, chars)?;
                    if prune {
                        node.children.remove(&ch);
                    }
                    Ok((payload, node.payload.is_none() && node.children.is_empty()))
                }
            }
        }

        let (payload, _) = recurse(&mut self.root, key.chars())?;
        self.len -= 1;
        Ok(payload)
    }

    /// Returns the payload associated with `key`, if any.
    pub fn get(&self, key: &str) -> Option<&P> {
        let mut node = &self.root;
        for ch in key.chars() {
            node = node.children.get(&ch)?;
        }
        node.payload.as_ref()
    }

    /// Finds the longest key matching `input` starting at byte position
    /// `pos`, consuming as many characters as possible while a
    /// payload-bearing node remains reachable.
    ///
    /// Returns the payload of the deepest such node together with the byte
    /// position just past the matched prefix. Returns `None` (and conceptually
    /// leaves the cursor untouched) when no key matches at all.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not a character boundary of `input`.
    pub fn find_longest(&self, input: &str, pos: usize) -> Option<(&P, usize)> {
        let mut node = &self.root;
        let mut offset = pos;
        let mut best = None;
        for ch in input[pos..].chars() {
            match node.children.get(&ch) {
                Some(child) => {
                    node = child;
                    offset += ch.len_utf8();
                    if let Some(payload) = &node.payload {
                        best = Some((payload, offset));
                    }
                }
                None => break,
            }
        }
        best
    }

    /// Collects all payload-bearing keys in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        fn collect<P>(node: &Node<P>, prefix: &mut String, out: &mut Vec<String>) {
            if node.payload.is_some() {
                out.push(prefix.clone());
            }
            for (&ch, child) in &node.children {
                prefix.push(ch);
                collect(child, prefix, out);
                prefix.pop();
            }
        }

        let mut keys = Vec::with_capacity(self.len);
        collect(&self.root, &mut String::new(), &mut keys);
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn insert_and_get() {
        let mut dict = SymbolDict::new();
        dict.insert("sin", 1).unwrap();
        dict.insert("sinh", 2).unwrap();
        dict.insert("-", 3).unwrap();

        assert_eq!(dict.len(), 3);
        assert_eq!(dict.get("sin"), Some(&1));
        assert_eq!(dict.get("sinh"), Some(&2));
        assert_eq!(dict.get("si"), None);
        assert_eq!(dict.get("sinhh"), None);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut dict = SymbolDict::new();
        dict.insert("pi", 1).unwrap();
        assert_matches!(dict.insert("pi", 2), Err(DictError::Duplicate));
        assert_eq!(dict.get("pi"), Some(&1));
    }

    #[test]
    fn replacing_payloads() {
        let mut dict = SymbolDict::new();
        dict.insert("max", 1).unwrap();
        assert_eq!(dict.replace("max", 5).unwrap(), 1);
        assert_eq!(dict.get("max"), Some(&5));

        assert_matches!(dict.replace("ma", 7), Err(DictError::Missing));
        assert_matches!(dict.replace("min", 7), Err(DictError::Missing));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn longest_match_prefers_deepest_payload() {
        let mut dict = SymbolDict::new();
        dict.insert("-", 1).unwrap();
        dict.insert("->", 2).unwrap();
        dict.insert("-=", 3).unwrap();

        assert_eq!(dict.find_longest("-x", 0), Some((&1, 1)));
        assert_eq!(dict.find_longest("->x", 0), Some((&2, 2)));
        assert_eq!(dict.find_longest("a-=1", 1), Some((&3, 3)));
    }

    #[test]
    fn failed_lookup_reports_none() {
        let mut dict = SymbolDict::new();
        dict.insert("cos", 1).unwrap();
        // `co` descends two nodes, but no payload is ever seen.
        assert_eq!(dict.find_longest("cot", 0), None);
        assert_eq!(dict.find_longest("xcos", 0), None);
    }

    #[test]
    fn removal_prunes_dangling_chain() {
        let mut dict = SymbolDict::new();
        dict.insert("sin", 1).unwrap();
        dict.insert("sinh", 2).unwrap();

        assert_eq!(dict.remove("sinh").unwrap(), 2);
        assert_eq!(dict.find_longest("sinh", 0), Some((&1, 3)));
        assert_eq!(dict.get("sinh"), None);
        assert_eq!(dict.get("sin"), Some(&1));

        // Removing the prefix key must not disturb a longer key.
        dict.insert("sinh", 2).unwrap();
        assert_eq!(dict.remove("sin").unwrap(), 1);
        assert_eq!(dict.get("sinh"), Some(&2));
        assert_eq!(dict.find_longest("sin", 0), None);

        assert_matches!(dict.remove("sin"), Err(DictError::Missing));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn keys_are_sorted() {
        let mut dict = SymbolDict::new();
        for (i, key) in ["tan", "atan", "atan2", "abs"].iter().enumerate() {
            dict.insert(key, i).unwrap();
        }
        assert_eq!(dict.keys(), ["abs", "atan", "atan2", "tan"]);
    }

    #[test]
    fn non_ascii_keys() {
        let mut dict = SymbolDict::new();
        dict.insert("π", 1).unwrap();
        dict.insert("τ", 2).unwrap();
        assert_eq!(dict.find_longest("π/2", 0), Some((&1, "π".len())));
    }
}
