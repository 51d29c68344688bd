// Field and method references checked against their declaring classes
//
// The owner named by a reference is resolved through the chain, then the
// member is looked up by name and descriptor:
// - fields in the owner, its interfaces, then its super classes
// - methods in the owner, its super classes, then its interfaces
// A member that is found must be accessible from the referencing class.
// A member that is not found is only reported when the whole search stayed
// within resolved classes of known ancestry. References to unresolved
// owners are left to the unresolved class analysis.

use crate::model::{ClassDef, Classpath, FieldRef, MemberDef, MethodRef};
use crate::resolve::{AccessCheck, ResolutionChain};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Owners whose signature-polymorphic methods match any descriptor
const POLYMORPHIC_OWNERS: &[&str] = &["java.lang.invoke.MethodHandle", "java.lang.invoke.VarHandle"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberProblem {
    Missing,
    Inaccessible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberIssue {
    pub artifact: String,
    pub class_name: String,
    /// Class named by the reference
    pub owner: String,
    /// `name:descriptor` for fields, `name(params)return` for methods
    pub member: String,
    pub problem: MemberProblem,
    /// Class declaring an inaccessible member
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_in: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    Field,
    Method,
}

enum Lookup {
    Found(Arc<ClassDef>, MemberDef),
    Missing,
    /// Not found, but part of the hierarchy could not be searched
    Unknown,
}

pub fn find_member_issues(classpath: &Classpath, chain: &ResolutionChain) -> Vec<MemberIssue> {
    let rows: Vec<Vec<MemberIssue>> = classpath
        .jar_files()
        .par_iter()
        .map(|jar_file| {
            let resolver = MemberResolver::new(chain);
            let mut rows = Vec::new();

            for class in jar_file.classes().iter().filter(|c| !c.is_module_info()) {
                let Some(references) = class.references() else {
                    continue;
                };

                let fields = references.fields.iter().map(field_target);
                let methods = references.methods.iter().map(method_target);

                for (kind, owner, name, descriptor) in fields.chain(methods) {
                    if let Some((problem, declared_in)) = resolver.check(class, kind, owner, name, descriptor) {
                        rows.push(MemberIssue {
                            artifact: jar_file.display_name().to_string(),
                            class_name: class.name().to_string(),
                            owner: owner.to_string(),
                            member: format_member(kind, name, descriptor),
                            problem,
                            declared_in,
                        });
                    }
                }
            }
            rows
        })
        .collect();

    rows.into_iter().flatten().collect()
}

fn field_target(field: &FieldRef) -> (MemberKind, &str, &str, &str) {
    (MemberKind::Field, field.owner.as_str(), field.name.as_str(), field.descriptor.as_str())
}

fn method_target(method: &MethodRef) -> (MemberKind, &str, &str, &str) {
    (MemberKind::Method, method.owner.as_str(), method.name.as_str(), method.descriptor.as_str())
}

fn format_member(kind: MemberKind, name: &str, descriptor: &str) -> String {
    match kind {
        MemberKind::Field => format!("{}:{}", name, descriptor),
        MemberKind::Method => format!("{}{}", name, descriptor),
    }
}

struct MemberResolver<'a> {
    chain: &'a ResolutionChain,
    check: AccessCheck<'a>,
}

impl<'a> MemberResolver<'a> {
    fn new(chain: &'a ResolutionChain) -> Self {
        Self {
            chain,
            check: AccessCheck::new(chain),
        }
    }

    /// Problem with one reference from `source`, if any
    fn check(
        &self,
        source: &ClassDef,
        kind: MemberKind,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Option<(MemberProblem, Option<String>)> {
        let owner_class = self.chain.resolve(owner)?;

        let mut visited = HashSet::new();
        match self.search(&owner_class, kind, name, descriptor, &mut visited) {
            Lookup::Found(declaring, member) => {
                if self.check.member_accessible(source, &declaring, member.access) {
                    None
                } else {
                    Some((MemberProblem::Inaccessible, Some(declaring.name().to_string())))
                }
            }
            Lookup::Missing => Some((MemberProblem::Missing, None)),
            Lookup::Unknown => {
                trace!("Unable to verify {}.{} from {}", owner, name, source.name());
                None
            }
        }
    }

    fn search(
        &self,
        class: &Arc<ClassDef>,
        kind: MemberKind,
        name: &str,
        descriptor: &str,
        visited: &mut HashSet<String>,
    ) -> Lookup {
        if !visited.insert(class.name().to_string()) {
            return Lookup::Missing;
        }

        if let Some(member) = declared_member(class, kind, name, descriptor) {
            return Lookup::Found(class.clone(), member.clone());
        }

        let mut unknown = class.has_unknown_ancestry();
        let parents: Vec<&str> = match kind {
            MemberKind::Field => class
                .interfaces()
                .iter()
                .map(String::as_str)
                .chain(class.super_name())
                .collect(),
            MemberKind::Method => class.parents().collect(),
        };

        for parent in parents {
            match self.chain.resolve(parent) {
                Some(parent_class) => match self.search(&parent_class, kind, name, descriptor, visited) {
                    found @ Lookup::Found(..) => return found,
                    Lookup::Unknown => unknown = true,
                    Lookup::Missing => {}
                },
                None => unknown = true,
            }
        }

        if unknown {
            Lookup::Unknown
        } else {
            Lookup::Missing
        }
    }
}

fn declared_member<'c>(class: &'c ClassDef, kind: MemberKind, name: &str, descriptor: &str) -> Option<&'c MemberDef> {
    match kind {
        MemberKind::Field => class.field(name, descriptor),
        MemberKind::Method if POLYMORPHIC_OWNERS.contains(&class.name()) => class
            .method(name, descriptor)
            .or_else(|| class.methods().iter().find(|m| m.name == name)),
        MemberKind::Method => class.method(name, descriptor),
    }
}
