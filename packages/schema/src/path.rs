//! Route paths with validated, lowercased identifier components.

use std::fmt;

use crate::SchemaError;

/// The path a callable or error type is served under.
///
/// Components are Unicode identifiers (per UAX#31), stored lowercase so that
/// `Hello` and `hello` derive the same route on server and client.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoutePath {
    components: Vec<String>,
}

impl RoutePath {
    /// The root path, rendered as `""`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash separated path.
    ///
    /// Empty components are ignored, so leading, trailing and doubled
    /// slashes normalize away.
    ///
    /// ```rust
    /// use entangle_schema::RoutePath;
    ///
    /// let path = RoutePath::parse("/Greetings/hello/").unwrap();
    /// assert_eq!(path.to_string(), "/greetings/hello");
    /// assert_eq!(RoutePath::parse("").unwrap().to_string(), "");
    /// ```
    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        let mut path = Self::root();
        for component in s.split('/').filter(|c| !c.is_empty()) {
            path = path.child(component)?;
        }
        Ok(path)
    }

    /// Extend the path by one declared name.
    pub fn child(&self, name: &str) -> Result<Self, SchemaError> {
        validate_name(name)?;
        let mut components = self.components.clone();
        components.push(name.to_lowercase());
        Ok(Self { components })
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The last component, if any.
    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

/// Check that a declared name can become a path component.
pub(crate) fn validate_name(name: &str) -> Result<(), SchemaError> {
    let invalid = |message: String| SchemaError::InvalidName {
        name: name.to_string(),
        message,
    };

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("empty name".to_string()));
    };

    // First char: XID_Start, or underscore followed by XID_Continue
    let valid_start = unicode_ident::is_xid_start(first)
        || (first == '_'
            && chars
                .clone()
                .next()
                .is_some_and(unicode_ident::is_xid_continue));

    if !valid_start {
        return Err(invalid(
            "must start with a letter or underscore followed by letter/digit".to_string(),
        ));
    }

    for c in chars {
        if !unicode_ident::is_xid_continue(c) {
            return Err(invalid(format!("invalid character '{}' in identifier", c)));
        }
    }

    Ok(())
}
