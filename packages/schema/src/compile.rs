//! Path compiler.
//!
//! Walks a schema depth-first and derives one route per leaf:
//!
//! - a branch child extends the path with `/` + the lowercased name
//! - the `default` child of a branch lands on the branch's own path
//! - a leaf at the root lands on the root path `""`
//! - an empty branch contributes nothing

use std::collections::BTreeMap;

use crate::error::Result;
use crate::node::{Node, DEFAULT_ENTRY};
use crate::{RoutePath, SchemaError};

/// What a route points at.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<C, E> {
    Callable(C),
    ErrorType(E),
}

/// A compiled (path, leaf) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Route<C, E> {
    pub path: RoutePath,
    /// The leaf's declared name, original case. A `default` entry takes the
    /// name of its branch; a root leaf has an empty name.
    pub name: String,
    pub target: Target<C, E>,
}

/// Every route of a schema, in declaration order.
#[derive(Debug, Clone)]
pub struct CompiledSchema<C, E> {
    routes: Vec<Route<C, E>>,
    index: BTreeMap<RoutePath, usize>,
}

/// Compile a schema tree into routes.
///
/// Fails when a name is not an identifier or when two leaves derive the same
/// path (`Hello` and `hello`, or a `default` entry colliding with a sibling
/// of the parent).
pub fn compile<C: Clone, E: Clone>(root: &Node<C, E>) -> Result<CompiledSchema<C, E>> {
    let mut compiled = CompiledSchema {
        routes: Vec::new(),
        index: BTreeMap::new(),
    };
    compiled.walk(root, RoutePath::root(), "")?;
    tracing::debug!(routes = compiled.routes.len(), "compiled schema");
    Ok(compiled)
}

impl<C: Clone, E: Clone> CompiledSchema<C, E> {
    fn walk(&mut self, node: &Node<C, E>, path: RoutePath, name: &str) -> Result<()> {
        match node {
            Node::Callable(c) => self.push(path, name, Target::Callable(c.clone())),
            Node::ErrorType(e) => self.push(path, name, Target::ErrorType(e.clone())),
            Node::Branch(branch) => {
                for (child_name, child) in branch.entries() {
                    if child_name == DEFAULT_ENTRY {
                        self.walk(child, path.clone(), name)?;
                    } else {
                        self.walk(child, path.child(child_name)?, child_name)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn push(&mut self, path: RoutePath, name: &str, target: Target<C, E>) -> Result<()> {
        if let Some(&existing) = self.index.get(&path) {
            return Err(SchemaError::DuplicateRoute {
                path: path.to_string(),
                first: self.routes[existing].name.clone(),
                second: name.to_string(),
            });
        }
        self.index.insert(path.clone(), self.routes.len());
        self.routes.push(Route {
            path,
            name: name.to_string(),
            target,
        });
        Ok(())
    }
}

impl<C, E> CompiledSchema<C, E> {
    pub fn routes(&self) -> &[Route<C, E>] {
        &self.routes
    }

    /// Find the route at a path. The lookup is case-insensitive.
    pub fn get(&self, path: &str) -> Option<&Route<C, E>> {
        let path = RoutePath::parse(path).ok()?;
        self.route(&path)
    }

    pub fn route(&self, path: &RoutePath) -> Option<&Route<C, E>> {
        self.index.get(path).map(|&i| &self.routes[i])
    }

    /// Callable routes only.
    pub fn callables(&self) -> impl Iterator<Item = (&Route<C, E>, &C)> {
        self.routes.iter().filter_map(|route| match &route.target {
            Target::Callable(c) => Some((route, c)),
            Target::ErrorType(_) => None,
        })
    }

    /// Error type routes only.
    pub fn error_types(&self) -> impl Iterator<Item = (&Route<C, E>, &E)> {
        self.routes.iter().filter_map(|route| match &route.target {
            Target::ErrorType(e) => Some((route, e)),
            Target::Callable(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
