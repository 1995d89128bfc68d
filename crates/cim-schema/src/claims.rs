//! # Recursive Claim Walker
//!
//! Decodes and encodes [`CredentialDefinition`] values and the
//! `credentialSubject` trees beneath them.
//!
//! ## Shape Sniffing
//!
//! A `credentialSubject` member value is classified by structure, in this
//! order:
//!
//! 1. an object with a `type` member is a nested definition,
//! 2. an array is a list of definitions (each element decoded as one),
//! 3. any other object is a claim leaf,
//! 4. anything else is `UnrecognizedClaimShape`.
//!
//! Rule 1 wins over rule 3: a leaf-like object that also carries `type` is
//! always read as a nested definition.
//!
//! ## No Native Recursion
//!
//! Both directions run on an index arena and a heap work list, so a claim
//! tree of any depth is walked in constant native stack. Decoding fills
//! arena slots top-down and then assembles typed values bottom-up; since
//! every child is allocated after its parent, assembling in reverse slot
//! order always finds children already built. Encoding does the same with
//! JSON values.
//!
//! Arena slots keep a parent index and one path segment rather than a full
//! [`FieldPath`]; a slot's path is rebuilt only while that slot is being
//! processed, so memory stays linear in the size of the tree.

use cim_core::{
    ClaimLeaf, ClaimNode, ClaimValue, CredentialDefinition, EncodeError, FieldErrorKind, FieldPath,
    PathSegment,
};
use serde_json::{Map, Value};

use crate::decode::DecodeCtx;
use crate::encode::{string_array, Encoder};
use crate::registry::{json_kind, RecordType};

/// Structural classification of a `credentialSubject` member value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimShape {
    Definition,
    DefinitionList,
    Leaf,
    Unrecognized,
}

/// Classify a raw claim value.
pub fn sniff(value: &Value) -> ClaimShape {
    match value {
        Value::Object(members) if members.contains_key("type") => ClaimShape::Definition,
        Value::Array(_) => ClaimShape::DefinitionList,
        Value::Object(_) => ClaimShape::Leaf,
        _ => ClaimShape::Unrecognized,
    }
}

// ─── Paths ───────────────────────────────────────────────────────────────

/// Parent links for arena slots. A slot's path is its parent's path plus
/// one segment and is rebuilt only while that slot is being processed, so
/// queued work and built entries hold no full paths.
struct Trail<'p> {
    base: &'p FieldPath,
    links: Vec<Option<(usize, PathSegment)>>,
}

impl<'p> Trail<'p> {
    fn new(base: &'p FieldPath) -> Self {
        Self {
            base,
            links: vec![None],
        }
    }

    /// Record the link for the slot allocated next.
    fn link(&mut self, parent: usize, segment: PathSegment) {
        self.links.push(Some((parent, segment)));
    }

    fn path(&self, slot: usize) -> FieldPath {
        let mut segments = Vec::new();
        let mut at = slot;
        while let Some((parent, segment)) = &self.links[at] {
            segments.push(segment);
            at = *parent;
        }
        let mut path = self.base.clone();
        for segment in segments.into_iter().rev() {
            path.push(segment.clone());
        }
        path
    }
}

// ─── Decode ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Expect {
    Definition,
    Subject,
    Claim,
}

struct Task<'v> {
    value: &'v Value,
    expect: Expect,
    slot: usize,
}

enum Slot {
    Pending,
    Failed,
    Definition {
        types: Option<Vec<String>>,
        subject: Option<usize>,
    },
    Subject(Vec<(String, usize)>),
    List(Vec<usize>),
    Leaf(ClaimLeaf),
}

enum Built {
    Definition(CredentialDefinition),
    Subject(ClaimNode),
    List(Vec<CredentialDefinition>),
    Leaf(ClaimLeaf),
}

impl DecodeCtx<'_> {
    /// Decode a credential definition and its whole claim tree.
    pub(crate) fn credential_definition(
        &mut self,
        value: &Value,
        path: &FieldPath,
    ) -> Option<CredentialDefinition> {
        let before = self.errors.len();
        let mut slots = vec![Slot::Pending];
        let mut trail = Trail::new(path);
        let mut work = vec![Task {
            value,
            expect: Expect::Definition,
            slot: 0,
        }];

        while let Some(task) = work.pop() {
            let mut children = Vec::new();
            let filled = self.decode_task(&task, &mut slots, &mut trail, &mut children);
            slots[task.slot] = filled;
            // Reverse so that siblings are popped, and their errors
            // reported, in key order.
            work.extend(children.into_iter().rev());
        }

        if self.errors.len() != before {
            return None;
        }
        match assemble(slots)? {
            Built::Definition(def) => Some(def),
            _ => None,
        }
    }

    fn decode_task<'v>(
        &mut self,
        task: &Task<'v>,
        slots: &mut Vec<Slot>,
        trail: &mut Trail<'_>,
        children: &mut Vec<Task<'v>>,
    ) -> Slot {
        let path = trail.path(task.slot);
        let parent = task.slot;
        let mut alloc = |value: &'v Value, segment: PathSegment, expect: Expect| {
            slots.push(Slot::Pending);
            trail.link(parent, segment);
            let slot = slots.len() - 1;
            children.push(Task { value, expect, slot });
            slot
        };

        let expect = match task.expect {
            Expect::Claim => match sniff(task.value) {
                ClaimShape::Definition => Expect::Definition,
                ClaimShape::DefinitionList => {
                    let items = task.value.as_array().map(Vec::as_slice).unwrap_or_default();
                    let list = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| alloc(item, PathSegment::Index(i), Expect::Definition))
                        .collect();
                    return Slot::List(list);
                }
                ClaimShape::Leaf => {
                    return match self.claim_leaf(task.value, &path) {
                        Some(leaf) => Slot::Leaf(leaf),
                        None => Slot::Failed,
                    };
                }
                ClaimShape::Unrecognized => {
                    self.push(
                        path,
                        FieldErrorKind::UnrecognizedClaimShape {
                            actual: json_kind(task.value).to_string(),
                        },
                    );
                    return Slot::Failed;
                }
            },
            other => other,
        };

        match expect {
            Expect::Subject => {
                let Some(members) = task.value.as_object() else {
                    self.type_mismatch(path, "object", task.value);
                    return Slot::Failed;
                };
                let claims = members
                    .iter()
                    .map(|(name, member)| {
                        let slot = alloc(member, PathSegment::Key(name.clone()), Expect::Claim);
                        (name.clone(), slot)
                    })
                    .collect();
                Slot::Subject(claims)
            }
            _ => {
                let Some(view) = self.open(task.value, &path, RecordType::CredentialDefinition)
                else {
                    return Slot::Failed;
                };
                let types = self.strings(&view, "type");
                let subject = self
                    .field(&view, "credentialSubject", |_, value, _, _| Some(value))
                    .map(|value| {
                        alloc(value, PathSegment::Key("credentialSubject".into()), Expect::Subject)
                    });
                Slot::Definition { types, subject }
            }
        }
    }

    fn claim_leaf(&mut self, value: &Value, path: &FieldPath) -> Option<ClaimLeaf> {
        let view = self.open(value, path, RecordType::ClaimLeaf)?;
        let mandatory = self.boolean(&view, "mandatory");
        let value_type = self.string(&view, "value_type");
        let display = self.records(&view, "display", Self::base_display);
        Some(ClaimLeaf {
            mandatory: mandatory.unwrap_or(false),
            value_type,
            display,
        })
    }
}

/// Build typed values from filled slots, children before parents.
/// Returns the value of slot 0.
fn assemble(slots: Vec<Slot>) -> Option<Built> {
    let mut built: Vec<Option<Built>> = Vec::with_capacity(slots.len());
    built.resize_with(slots.len(), || None);

    for (index, slot) in slots.into_iter().enumerate().rev() {
        let value = match slot {
            Slot::Pending | Slot::Failed => return None,
            Slot::Definition { types, subject } => {
                let credential_subject = match subject {
                    Some(child) => match built[child].take()? {
                        Built::Subject(node) => Some(node),
                        _ => return None,
                    },
                    None => None,
                };
                Built::Definition(CredentialDefinition {
                    types: types?,
                    credential_subject,
                })
            }
            Slot::Subject(claims) => {
                let mut node = ClaimNode::new();
                for (name, child) in claims {
                    let claim = match built[child].take()? {
                        Built::Definition(def) => ClaimValue::Definition(def),
                        Built::List(defs) => ClaimValue::DefinitionList(defs),
                        Built::Leaf(leaf) => ClaimValue::Leaf(leaf),
                        Built::Subject(_) => return None,
                    };
                    node.insert(name, claim);
                }
                Built::Subject(node)
            }
            Slot::List(items) => {
                let mut defs = Vec::with_capacity(items.len());
                for child in items {
                    match built[child].take()? {
                        Built::Definition(def) => defs.push(def),
                        _ => return None,
                    }
                }
                Built::List(defs)
            }
            Slot::Leaf(leaf) => Built::Leaf(leaf),
        };
        built[index] = Some(value);
    }
    built.into_iter().next().flatten()
}

// ─── Encode ──────────────────────────────────────────────────────────────

enum Item<'a> {
    Definition(&'a CredentialDefinition),
    Subject(&'a ClaimNode),
    List(&'a [CredentialDefinition]),
    Leaf(&'a ClaimLeaf),
}

struct Entry<'a> {
    item: Item<'a>,
    /// Child slots, with the member name for subject entries.
    children: Vec<(Option<&'a str>, usize)>,
}

impl Encoder {
    /// Encode a credential definition and its whole claim tree.
    pub(crate) fn credential_definition(
        &self,
        definition: &CredentialDefinition,
        path: &FieldPath,
    ) -> Result<Value, EncodeError> {
        let mut arena = vec![Entry {
            item: Item::Definition(definition),
            children: Vec::new(),
        }];
        let mut trail = Trail::new(path);

        // Expand in slot order; every entry appends its children to the end.
        let mut next = 0;
        while next < arena.len() {
            let mut discovered: Vec<(Option<&str>, Item<'_>, PathSegment)> = Vec::new();
            match arena[next].item {
                Item::Definition(def) => {
                    if let Some(subject) = &def.credential_subject {
                        discovered.push((
                            None,
                            Item::Subject(subject),
                            PathSegment::Key("credentialSubject".into()),
                        ));
                    }
                }
                Item::Subject(node) => {
                    for (name, claim) in node {
                        let item = match claim {
                            ClaimValue::Definition(def) => Item::Definition(def),
                            ClaimValue::DefinitionList(defs) => Item::List(defs),
                            ClaimValue::Leaf(leaf) => Item::Leaf(leaf),
                        };
                        discovered.push((Some(name.as_str()), item, PathSegment::Key(name.clone())));
                    }
                }
                Item::List(defs) => {
                    for (i, def) in defs.iter().enumerate() {
                        discovered.push((None, Item::Definition(def), PathSegment::Index(i)));
                    }
                }
                Item::Leaf(_) => {}
            }
            for (name, item, segment) in discovered {
                arena.push(Entry {
                    item,
                    children: Vec::new(),
                });
                trail.link(next, segment);
                let child = arena.len() - 1;
                arena[next].children.push((name, child));
            }
            next += 1;
        }

        let mut values: Vec<Option<Value>> = Vec::with_capacity(arena.len());
        values.resize_with(arena.len(), || None);
        for (index, entry) in arena.iter().enumerate().rev() {
            let mut take = |child: usize| values[child].take().unwrap_or(Value::Null);
            let value = match entry.item {
                Item::Definition(def) => {
                    let mut subject = entry.children.first().map(|(_, child)| take(*child));
                    self.record(RecordType::CredentialDefinition, &trail.path(index), |name, _| {
                        Ok(match name {
                            "type" => Some(string_array(&def.types)),
                            "credentialSubject" => subject.take(),
                            _ => None,
                        })
                    })?
                }
                Item::Subject(_) => {
                    let mut members = Map::new();
                    for (name, child) in &entry.children {
                        members.insert(name.unwrap_or_default().to_string(), take(*child));
                    }
                    Value::Object(members)
                }
                Item::List(_) => {
                    Value::Array(entry.children.iter().map(|(_, child)| take(*child)).collect())
                }
                Item::Leaf(leaf) => self.claim_leaf(leaf, &trail.path(index))?,
            };
            values[index] = Some(value);
        }
        Ok(values.into_iter().next().flatten().unwrap_or(Value::Null))
    }

    fn claim_leaf(&self, leaf: &ClaimLeaf, path: &FieldPath) -> Result<Value, EncodeError> {
        self.record(RecordType::ClaimLeaf, path, |name, at| {
            Ok(match name {
                "mandatory" => leaf.mandatory.then_some(Value::Bool(true)),
                "value_type" => leaf.value_type.as_deref().map(Value::from),
                "display" => self.base_displays(&leaf.display, at)?,
                _ => None,
            })
        })
    }
}
