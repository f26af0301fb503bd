//! Relation declarations and delete planning.
//!
//! # Responsibility
//! - Declare every owner -> target relation with an explicit delete policy.
//! - Resolve pass-through relations into a join path.
//! - Turn a delete request into a `DeletePlan` before anything is mutated.
//!
//! # Invariants
//! - The `HasMany` graph in `RELATIONS` is acyclic.
//! - `Through` relations never contribute to a delete plan.
//! - Plan deletions are ordered leaves first, root last.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Tables participating in the entity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Parents,
    Entities,
    Children,
    Grandchildren,
    EntityRefs,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parents => "parents",
            Self::Entities => "entities",
            Self::Children => "children",
            Self::Grandchildren => "grandchildren",
            Self::EntityRefs => "entity_refs",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What deleting an owner does to rows of a `HasMany` relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Delete dependent rows together with the owner.
    Cascade,
    /// Refuse to delete the owner while dependent rows exist.
    Restrict,
    /// Leave dependent rows alone; storage constraints decide.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Rows of `target` whose `foreign_key` column holds the owner uuid.
    HasMany {
        target: Table,
        foreign_key: &'static str,
        policy: DeletePolicy,
    },
    /// Rows of relation `source` on the target of relation `via`.
    Through {
        via: &'static str,
        source: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub owner: Table,
    pub name: &'static str,
    pub kind: RelationKind,
}

pub const RELATIONS: &[Relation] = &[
    Relation {
        owner: Table::Parents,
        name: "entities",
        kind: RelationKind::HasMany {
            target: Table::Entities,
            foreign_key: "parent_uuid",
            policy: DeletePolicy::Restrict,
        },
    },
    Relation {
        owner: Table::Entities,
        name: "children",
        kind: RelationKind::HasMany {
            target: Table::Children,
            foreign_key: "entity_uuid",
            policy: DeletePolicy::Cascade,
        },
    },
    Relation {
        owner: Table::Entities,
        name: "grandchildren",
        kind: RelationKind::Through {
            via: "children",
            source: "grandchildren",
        },
    },
    Relation {
        owner: Table::Entities,
        name: "references",
        kind: RelationKind::HasMany {
            target: Table::EntityRefs,
            foreign_key: "entity_uuid",
            policy: DeletePolicy::Restrict,
        },
    },
    Relation {
        owner: Table::Children,
        name: "grandchildren",
        kind: RelationKind::HasMany {
            target: Table::Grandchildren,
            foreign_key: "child_uuid",
            policy: DeletePolicy::Cascade,
        },
    },
];

/// Looks up one declared relation by owner and name.
pub fn relation(owner: Table, name: &str) -> Option<&'static Relation> {
    RELATIONS
        .iter()
        .find(|relation| relation.owner == owner && relation.name == name)
}

/// One step from a set of owner rows to the rows that reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub table: Table,
    pub foreign_key: &'static str,
}

/// Rows of `table` reachable from one root row by following `path`.
///
/// An empty path addresses the root row itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub root: Table,
    pub path: Vec<Hop>,
}

impl Scope {
    pub fn root(table: Table) -> Self {
        Self {
            root: table,
            path: Vec::new(),
        }
    }

    /// Table holding the rows this scope addresses.
    pub fn table(&self) -> Table {
        self.path.last().map_or(self.root, |hop| hop.table)
    }

    fn push(&self, hop: Hop) -> Self {
        let mut path = self.path.clone();
        path.push(hop);
        Self {
            root: self.root,
            path,
        }
    }
}

/// Restrict relation that must be empty for the delete to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictCheck {
    pub relation: &'static str,
    pub scope: Scope,
}

/// Full decision for deleting one row of `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    pub root: Table,
    pub checks: Vec<RestrictCheck>,
    /// Leaves first; the last entry is the root row.
    pub deletions: Vec<Scope>,
}

/// Builds the delete plan for one row of `root` from `RELATIONS`.
pub fn plan_delete(root: Table) -> DeletePlan {
    let mut checks = Vec::new();
    let mut deletions = Vec::new();
    collect(&Scope::root(root), &mut checks, &mut deletions);
    DeletePlan {
        root,
        checks,
        deletions,
    }
}

fn collect(scope: &Scope, checks: &mut Vec<RestrictCheck>, deletions: &mut Vec<Scope>) {
    for relation in RELATIONS
        .iter()
        .filter(|relation| relation.owner == scope.table())
    {
        let RelationKind::HasMany {
            target,
            foreign_key,
            policy,
        } = relation.kind
        else {
            continue;
        };
        let next = scope.push(Hop {
            table: target,
            foreign_key,
        });
        match policy {
            DeletePolicy::Cascade => collect(&next, checks, deletions),
            DeletePolicy::Restrict => checks.push(RestrictCheck {
                relation: relation.name,
                scope: next,
            }),
            DeletePolicy::Ignore => {}
        }
    }
    deletions.push(scope.clone());
}

/// Resolves a relation on `owner` into the scope of rows it yields.
///
/// `Through` relations are expanded recursively into their join path.
pub fn resolve(owner: Table, name: &str) -> Option<Scope> {
    resolve_from(&Scope::root(owner), name)
}

fn resolve_from(scope: &Scope, name: &str) -> Option<Scope> {
    match relation(scope.table(), name)?.kind {
        RelationKind::HasMany {
            target,
            foreign_key,
            ..
        } => Some(scope.push(Hop {
            table: target,
            foreign_key,
        })),
        RelationKind::Through { via, source } => {
            let intermediate = resolve_from(scope, via)?;
            resolve_from(&intermediate, source)
        }
    }
}
