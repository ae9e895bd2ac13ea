//! Home to the `Name` primitive
//!
//! Stata names (variables, programs, macros) are case sensitive ASCII
//! identifiers. Keeping them behind a dedicated type let us tell them apart
//! from the free text found in strings and comments.

use std::fmt;

/// new type over identifier names
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Name(pub String);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name(s.to_owned())
    }
}
