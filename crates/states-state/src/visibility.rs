//! # Visibility and Call Scope
//!
//! Every state method carries a [`Visibility`]. Every dispatched call
//! carries a [`Scope`]: the highest visibility the caller may reach, and
//! the stated class the calling code belongs to. The proxy crate derives
//! the scope from an explicit [`CallerContext`]; nothing inspects a call
//! stack.

use serde::{Deserialize, Serialize};

use states_core::StatedClassName;

/// Visibility of a state method.
///
/// Ordered from least to most restricted, so `method <= scope.level`
/// reads as "reachable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Reachable from anywhere.
    Public,
    /// Reachable from the proxy's class hierarchy.
    Protected,
    /// Reachable only from code bound to the proxy's own class.
    Private,
}

impl Visibility {
    /// The canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is calling, as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallerContext {
    /// Code outside any stated class. Only public methods are reachable.
    External,
    /// Code belonging to the named stated class.
    Class(StatedClassName),
}

/// The access a single dispatched call is granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Most restricted visibility the call may reach.
    pub level: Visibility,
    /// Stated class of the calling code, if any.
    pub origin: Option<StatedClassName>,
}

impl Scope {
    /// Scope of an external call: public methods only.
    pub fn public() -> Self {
        Self {
            level: Visibility::Public,
            origin: None,
        }
    }

    /// Scope of code bound to a proxy, declared in `origin`.
    pub fn internal(origin: StatedClassName) -> Self {
        Self {
            level: Visibility::Private,
            origin: Some(origin),
        }
    }

    /// Whether this scope reaches a method of `visibility` declared by a
    /// state of `declared_in`, given that state's private mode.
    ///
    /// A private method of a state in private mode is reachable only from
    /// code whose origin is the class that declared the state.
    pub fn reaches(
        &self,
        visibility: Visibility,
        declared_in: Option<&StatedClassName>,
        private_mode: bool,
    ) -> bool {
        if visibility > self.level {
            return false;
        }
        if visibility == Visibility::Private && private_mode {
            return match (self.origin.as_ref(), declared_in) {
                (Some(origin), Some(declared)) => origin == declared,
                _ => false,
            };
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> StatedClassName {
        StatedClassName::new(name).unwrap()
    }

    #[test]
    fn test_visibility_ordering() {
        assert!(Visibility::Public < Visibility::Protected);
        assert!(Visibility::Protected < Visibility::Private);
    }

    #[test]
    fn test_public_scope_reaches_public_only() {
        let scope = Scope::public();
        assert!(scope.reaches(Visibility::Public, None, false));
        assert!(!scope.reaches(Visibility::Protected, None, false));
        assert!(!scope.reaches(Visibility::Private, None, false));
    }

    #[test]
    fn test_internal_scope_reaches_everything_outside_private_mode() {
        let scope = Scope::internal(class("Article"));
        let article = class("Article");
        assert!(scope.reaches(Visibility::Private, Some(&article), false));
        assert!(scope.reaches(Visibility::Protected, Some(&article), false));
    }

    #[test]
    fn test_private_mode_requires_declaring_origin() {
        let parent = class("Parent");
        let from_child = Scope::internal(class("Child"));
        let from_parent = Scope::internal(parent.clone());
        assert!(!from_child.reaches(Visibility::Private, Some(&parent), true));
        assert!(from_parent.reaches(Visibility::Private, Some(&parent), true));
        // Private mode only guards private methods.
        assert!(from_child.reaches(Visibility::Protected, Some(&parent), true));
    }

    #[test]
    fn test_visibility_serde() {
        let json = serde_json::to_string(&Visibility::Protected).unwrap();
        assert_eq!(json, "\"protected\"");
    }
}
