// JVM access control between classes and members
//
// Rules for member access, in order:
// - public members are accessible from anywhere
// - any member is accessible from its own class
// - private members are not accessible from any other class
// - protected and package-private members are accessible from the same package
// - protected members are accessible from subclasses in other packages
//
// The subclass walk follows super classes and interfaces through the
// resolution chain and keeps a visited set, so cyclic or self-referential
// hierarchies terminate. A walk that passes a class with unknown ancestry
// cannot rule out a runtime ancestor; protected access to a runtime class
// is then granted.

use super::ResolutionChain;
use crate::error::AccessError;
use crate::model::{AccessFlags, ClassDef};
use std::collections::HashSet;
use tracing::trace;

/// Outcome of a walk up the class hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ancestry {
    Found,
    NotFound,
    /// Not found, but the walk passed a class with unknown ancestry
    Unknown,
}

pub struct AccessCheck<'a> {
    chain: &'a ResolutionChain,
}

impl<'a> AccessCheck<'a> {
    pub fn new(chain: &'a ResolutionChain) -> Self {
        Self { chain }
    }

    /// Whether `source` may refer to the class `target`.
    ///
    /// Top-level classes are either public or package-private; protected
    /// or private class flags are rejected.
    pub fn class_accessible(&self, source: &ClassDef, target: &ClassDef) -> Result<bool, AccessError> {
        let access = target.access();
        if access.is_protected() || access.is_private() {
            return Err(AccessError::IllegalClassAccessFlags(target.name().to_string()));
        }

        Ok(access.is_public() || source.package_name() == target.package_name())
    }

    /// Whether `source` may access a member of `target` with `member` flags.
    pub fn member_accessible(&self, source: &ClassDef, target: &ClassDef, member: AccessFlags) -> bool {
        if member.is_public() {
            return true;
        }

        if source.name() == target.name() {
            return true;
        }

        if member.is_private() {
            return false;
        }

        if source.package_name() == target.package_name() {
            return true;
        }

        if member.is_protected() {
            return match self.ancestry(source, target.name()) {
                Ancestry::Found => true,
                Ancestry::Unknown => target.has_unknown_ancestry(),
                Ancestry::NotFound => false,
            };
        }

        false
    }

    /// Whether `class` extends or implements `ancestor`, directly or not.
    /// Ancestors that cannot be resolved end their branch of the walk.
    pub fn is_subclass(&self, class: &ClassDef, ancestor: &str) -> bool {
        self.ancestry(class, ancestor) == Ancestry::Found
    }

    fn ancestry(&self, class: &ClassDef, ancestor: &str) -> Ancestry {
        let mut visited = HashSet::new();
        self.ancestry_guarded(class, ancestor, &mut visited)
    }

    fn ancestry_guarded(&self, class: &ClassDef, ancestor: &str, visited: &mut HashSet<String>) -> Ancestry {
        if !visited.insert(class.name().to_string()) {
            trace!("Cycle in class hierarchy at {}", class.name());
            return Ancestry::NotFound;
        }

        let mut unknown = class.has_unknown_ancestry();
        for parent in class.parents() {
            if parent == ancestor {
                return Ancestry::Found;
            }

            match self.chain.resolve(parent) {
                Some(parent_class) => match self.ancestry_guarded(&parent_class, ancestor, visited) {
                    Ancestry::Found => return Ancestry::Found,
                    Ancestry::Unknown => unknown = true,
                    Ancestry::NotFound => {}
                },
                None => trace!("Unresolved ancestor {} of {}", parent, class.name()),
            }
        }

        if unknown {
            Ancestry::Unknown
        } else {
            Ancestry::NotFound
        }
    }
}
