//! Programs: code plus identity and provenance.

use crate::encoding;
use crate::Code;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Comments attached to a program: a header and per-instruction notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgramComments {
    header: Option<String>,
    at_instructions: BTreeMap<u16, String>,
}

impl ProgramComments {
    /// Creates an empty comment set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The header comment, shown before the program.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Sets the header comment.
    pub fn set_header(&mut self, text: impl Into<String>) {
        self.header = Some(text.into());
    }

    /// The comment attached to the instruction at `index`, if any.
    pub fn at_instruction(&self, index: u16) -> Option<&str> {
        self.at_instructions.get(&index).map(String::as_str)
    }

    /// Attaches a comment to the instruction at `index`.
    pub fn set_at_instruction(&mut self, index: u16, text: impl Into<String>) {
        self.at_instructions.insert(index, text.into());
    }

    pub(crate) fn at_instructions(&self) -> &BTreeMap<u16, String> {
        &self.at_instructions
    }

    /// Whether there are no comments at all.
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.at_instructions.is_empty()
    }
}

/// A program: code, a UUID, optional provenance and attribution.
///
/// A program exclusively owns its code; the optional parent chain forms a
/// DAG recording what the program was derived from. Programs are immutable
/// after construction and can be shared across threads.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    id: Uuid,
    code: Code,
    comments: ProgramComments,
    contributors: Vec<String>,
    parent: Option<Arc<Program>>,
}

impl Program {
    /// Creates a program with a fresh UUID and no provenance.
    pub fn new(code: Code) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            comments: ProgramComments::new(),
            contributors: Vec::new(),
            parent: None,
        }
    }

    /// Creates a program derived from `parent`.
    pub fn with_parent(code: Code, parent: Arc<Program>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(code)
        }
    }

    pub(crate) fn from_parts(
        id: Uuid,
        code: Code,
        comments: ProgramComments,
        contributors: Vec<String>,
        parent: Option<Arc<Program>>,
    ) -> Self {
        Self {
            id,
            code,
            comments,
            contributors,
            parent,
        }
    }

    /// The unique identifier of this program.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The code of this program.
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// The comments attached to this program.
    pub fn comments(&self) -> &ProgramComments {
        &self.comments
    }

    /// Mutable access to the comments.
    pub fn comments_mut(&mut self) -> &mut ProgramComments {
        &mut self.comments
    }

    /// The ordered set of components that contributed to this program.
    pub fn contributors(&self) -> &[String] {
        &self.contributors
    }

    /// Records that `name` contributed to this program.
    pub fn add_contributor(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.contributors.contains(&name) {
            self.contributors.push(name);
        }
    }

    /// The program this one was derived from, if any.
    pub fn parent(&self) -> Option<&Program> {
        self.parent.as_deref()
    }

    /// The number of instructions in this program.
    pub fn size(&self) -> usize {
        self.code.len()
    }

    /// Deep-copies this program through its serialized form.
    ///
    /// # Panics
    ///
    /// Panics if the program does not round-trip; that indicates invalid
    /// code was stored in it, which the embedder must prevent.
    pub fn deep_copy(&self) -> Program {
        encoding::decode_program(&encoding::encode_program(self))
            .expect("a valid program must round-trip")
    }
}
