//! The schema tree.
//!
//! A [`Node`] is a callable, a declared error type, or a branch of named
//! children. The leaf payloads are generic so the same tree shape serves the
//! server (real procedures and error classes) and the client (descriptions
//! read from a manifest).

/// Name of the branch entry served at the branch's own path.
pub const DEFAULT_ENTRY: &str = "default";

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<C, E> {
    /// A function that can be called remotely.
    Callable(C),
    /// A declared error type.
    ErrorType(E),
    /// Named children, in declaration order.
    Branch(Branch<C, E>),
}

impl<C, E> Node<C, E> {
    pub fn callable(callable: C) -> Self {
        Node::Callable(callable)
    }

    pub fn error_type(error: E) -> Self {
        Node::ErrorType(error)
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Branch(_))
    }

    /// Follow a chain of declared names. An empty chain is the node itself.
    pub fn descend<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<&Self> {
        let mut node = self;
        for name in names {
            match node {
                Node::Branch(branch) => node = branch.get(name)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Rebuild the tree with different leaf payloads.
    pub fn map<C2, E2>(
        &self,
        callable: &impl Fn(&C) -> C2,
        error: &impl Fn(&E) -> E2,
    ) -> Node<C2, E2> {
        match self {
            Node::Callable(c) => Node::Callable(callable(c)),
            Node::ErrorType(e) => Node::ErrorType(error(e)),
            Node::Branch(branch) => Node::Branch(Branch {
                entries: branch
                    .entries
                    .iter()
                    .map(|(name, child)| (name.clone(), child.map(callable, error)))
                    .collect(),
            }),
        }
    }
}

impl<C, E> From<Branch<C, E>> for Node<C, E> {
    fn from(branch: Branch<C, E>) -> Self {
        Node::Branch(branch)
    }
}

/// An ordered mapping of names to child nodes.
///
/// Names are unique within a branch: inserting an existing name replaces the
/// child in place, so a branch never holds more than one `default` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch<C, E> {
    entries: Vec<(String, Node<C, E>)>,
}

impl<C, E> Default for Branch<C, E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C, E> Branch<C, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Branch::insert`].
    pub fn with(mut self, name: impl Into<String>, node: impl Into<Node<C, E>>) -> Self {
        self.insert(name, node);
        self
    }

    /// Add a callable leaf.
    pub fn callable(self, name: impl Into<String>, callable: C) -> Self {
        self.with(name, Node::Callable(callable))
    }

    /// Add an error type leaf.
    pub fn error_type(self, name: impl Into<String>, error: E) -> Self {
        self.with(name, Node::ErrorType(error))
    }

    /// Insert a child, returning the one it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        node: impl Into<Node<C, E>>,
    ) -> Option<Node<C, E>> {
        let name = name.into();
        let node = node.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, node)),
            None => {
                self.entries.push((name, node));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node<C, E>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// The `default` entry, if any.
    pub fn default_entry(&self) -> Option<&Node<C, E>> {
        self.get(DEFAULT_ENTRY)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node<C, E>)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a remote function takes its arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Synchronous on the server. Listed in manifests, not callable remotely.
    Sync,
    /// Async, arguments sent as a JSON array.
    #[default]
    Async,
    /// Async, a single object argument sent as the body itself.
    PostBody,
}

/// Client-side description of a callable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallableSpec {
    pub kind: CallKind,
    /// Parameter names, one list per declared signature.
    pub signatures: Vec<Vec<String>>,
}

impl CallableSpec {
    /// An async function with one signature.
    pub fn asynchronous<S: Into<String>>(params: impl IntoIterator<Item = S>) -> Self {
        Self {
            kind: CallKind::Async,
            signatures: vec![params.into_iter().map(Into::into).collect()],
        }
    }

    /// A function that does not lead to an async result.
    pub fn synchronous() -> Self {
        Self {
            kind: CallKind::Sync,
            signatures: Vec::new(),
        }
    }

    /// An async function taking its single argument as the request body.
    pub fn post_body(param: impl Into<String>) -> Self {
        Self {
            kind: CallKind::PostBody,
            signatures: vec![vec![param.into()]],
        }
    }

    /// Add another overload.
    pub fn with_signature<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.signatures
            .push(params.into_iter().map(Into::into).collect());
        self
    }

    /// Number of positional parameters of the longest signature.
    pub fn arity(&self) -> usize {
        self.signatures.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether a client may call this over the wire.
    pub fn is_remote(&self) -> bool {
        self.kind != CallKind::Sync
    }
}

/// Client-side description of an error type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSpec {
    /// Declared name, e.g. `SpecialError`.
    pub name: String,
}

impl ErrorSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A schema as clients see it.
pub type Manifest = Node<CallableSpec, ErrorSpec>;
