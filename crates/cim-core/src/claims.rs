//! # Claim Trees
//!
//! The `credentialSubject` of a credential definition is a mapping from
//! claim name to one of three shapes:
//!
//! 1. a nested [`CredentialDefinition`] (an object with a `type` member),
//! 2. an array of nested definitions,
//! 3. a [`ClaimLeaf`] describing a terminal claim.
//!
//! The wire format carries no discriminant; the decoder assigns the
//! [`ClaimValue`] variant from the structure of the value. Once decoded,
//! the variant is explicit and no code downstream inspects raw JSON.
//!
//! ## Depth
//!
//! Claim trees have no depth limit. Everything in this crate and in the
//! codec that walks them uses explicit heap stacks, including `Drop`.

use std::collections::BTreeMap;

use crate::metadata::BaseDisplay;

/// Description of a credential type: its `type` array and optional claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDefinition {
    /// Non-empty list of type identifiers (`type`).
    pub types: Vec<String>,
    /// Claims offered in the credential (`credentialSubject`).
    pub credential_subject: Option<ClaimNode>,
}

impl CredentialDefinition {
    /// A definition with the given types and no claims.
    pub fn new(types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            credential_subject: None,
        }
    }

    /// Attach a claim tree.
    pub fn with_subject(mut self, subject: ClaimNode) -> Self {
        self.credential_subject = Some(subject);
        self
    }

    /// Returns true if `ty` is one of the declared types.
    pub fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }
}

/// Display and presence rules for a terminal claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimLeaf {
    /// Whether the claim must be present in issued credentials.
    /// Absent on the wire means `false`.
    pub mandatory: bool,
    /// Value type such as `string`, `number` or `image/jpeg`. Open-ended.
    pub value_type: Option<String>,
    /// Localized display names.
    pub display: Option<Vec<BaseDisplay>>,
}

/// One entry of a claim tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValue {
    /// A nested definition.
    Definition(CredentialDefinition),
    /// An array of nested definitions.
    DefinitionList(Vec<CredentialDefinition>),
    /// A terminal claim.
    Leaf(ClaimLeaf),
}

impl ClaimValue {
    /// Short name of the variant, used in logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Definition(_) => "definition",
            Self::DefinitionList(_) => "definition list",
            Self::Leaf(_) => "leaf",
        }
    }
}

/// A claim tree: claim name to [`ClaimValue`], ordered by name.
///
/// Traversal helpers and `Drop` run without native recursion. The derived
/// `Clone`, `PartialEq` and `Debug` impls do recurse, one frame group per
/// nesting level; avoid them on trees nested thousands of levels deep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimNode {
    claims: BTreeMap<String, ClaimValue>,
}

impl ClaimNode {
    /// An empty claim tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a claim.
    pub fn insert(&mut self, name: impl Into<String>, value: ClaimValue) -> Option<ClaimValue> {
        self.claims.insert(name.into(), value)
    }

    /// Builder form of [`ClaimNode::insert`].
    pub fn with(mut self, name: impl Into<String>, value: ClaimValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a claim by name.
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.claims.get(name)
    }

    /// Iterate claims in name order.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, ClaimValue> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Number of nested claim trees below this one, counting this one.
    /// Computed without recursion.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&ClaimNode> = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            for value in node.claims.values() {
                push_subjects(value, &mut stack);
            }
        }
        count
    }

    /// Longest chain of nested claim trees, counting this one.
    /// Computed without recursion.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(&ClaimNode, usize)> = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            for value in node.claims.values() {
                let mut children = Vec::new();
                push_subjects(value, &mut children);
                stack.extend(children.into_iter().map(|c| (c, depth + 1)));
            }
        }
        max
    }

    /// Names of every leaf claim marked `mandatory`, as dotted paths from
    /// this node. Array positions are not included in the names.
    pub fn mandatory_claims(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<(&ClaimNode, String)> = vec![(self, String::new())];
        while let Some((node, prefix)) = stack.pop() {
            for (name, value) in &node.claims {
                let full = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                match value {
                    ClaimValue::Leaf(leaf) if leaf.mandatory => out.push(full),
                    ClaimValue::Leaf(_) => {}
                    other => {
                        let mut children = Vec::new();
                        push_subjects(other, &mut children);
                        stack.extend(children.into_iter().map(|c| (c, full.clone())));
                    }
                }
            }
        }
        out.sort();
        out.dedup();
        out
    }
}

impl FromIterator<(String, ClaimValue)> for ClaimNode {
    fn from_iter<T: IntoIterator<Item = (String, ClaimValue)>>(iter: T) -> Self {
        Self {
            claims: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ClaimNode {
    type Item = (&'a String, &'a ClaimValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ClaimValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.iter()
    }
}

fn push_subjects<'a>(value: &'a ClaimValue, stack: &mut Vec<&'a ClaimNode>) {
    match value {
        ClaimValue::Definition(def) => stack.extend(def.credential_subject.as_ref()),
        ClaimValue::DefinitionList(defs) => {
            stack.extend(defs.iter().filter_map(|d| d.credential_subject.as_ref()))
        }
        ClaimValue::Leaf(_) => {}
    }
}

impl Drop for ClaimNode {
    fn drop(&mut self) {
        // Detach nested subjects onto a heap stack so that dropping a deep
        // tree never recurses through the native call stack.
        let mut pending: Vec<ClaimNode> = Vec::new();
        detach_subjects(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_subjects(&mut node, &mut pending);
        }
    }
}

fn detach_subjects(node: &mut ClaimNode, pending: &mut Vec<ClaimNode>) {
    for (_, value) in std::mem::take(&mut node.claims) {
        match value {
            ClaimValue::Definition(mut def) => pending.extend(def.credential_subject.take()),
            ClaimValue::DefinitionList(defs) => {
                for mut def in defs {
                    pending.extend(def.credential_subject.take());
                }
            }
            ClaimValue::Leaf(_) => {}
        }
    }
}
