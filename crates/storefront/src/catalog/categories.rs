//! Category tree organisation.
//!
//! The API lists categories flat, each with an optional `parent_id`.
//! [`organize_categories`] derives the nested views used by the navigation
//! menu, the category landing page, and breadcrumbs.
//!
//! Sibling order always follows input order. A category whose parent is
//! not in the input, or whose ancestor chain loops, is rejected.

use std::collections::{HashMap, HashSet};

use bazaar_core::CategoryId;
use serde::Serialize;
use thiserror::Error;

use super::types::Category;

/// Errors from inconsistent category data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CategoryError {
    /// A category references a parent that is not in the collection.
    #[error("category {category_id} references missing parent {parent_id}")]
    MissingParent {
        category_id: CategoryId,
        parent_id: CategoryId,
    },

    /// Walking up the parent chain revisited a category.
    #[error("category {category_id} is part of a parent cycle")]
    Cycle { category_id: CategoryId },
}

/// A root category with its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentWithChildren {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

/// A child category carrying a shallow copy of its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubCategory {
    #[serde(flatten)]
    pub category: Category,
    pub parent: Category,
}

/// A root category with its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootCategory {
    #[serde(flatten)]
    pub category: Category,
    #[serde(rename = "subCategory")]
    pub sub_category: Vec<SubCategory>,
}

/// A category together with every ancestor above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncestorChain {
    #[serde(flatten)]
    pub category: Category,
    #[serde(rename = "categoryParent")]
    pub category_parent: Option<Box<AncestorChain>>,
}

impl AncestorChain {
    /// Iterate from this category up to the root.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        std::iter::successors(Some(self), |link| link.category_parent.as_deref())
            .map(|link| &link.category)
    }
}

/// A direct child with a back-reference to its resolved parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildCategory {
    #[serde(flatten)]
    pub category: Category,
    #[serde(rename = "categoryParent")]
    pub category_parent: AncestorChain,
}

/// Any category with its resolved ancestors and direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCategory {
    #[serde(flatten)]
    pub category: Category,
    #[serde(rename = "categoryParent")]
    pub category_parent: Option<AncestorChain>,
    pub children: Vec<ChildCategory>,
}

/// All derived category views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTree {
    pub parents_with_children: Vec<ParentWithChildren>,
    pub parents_without_children: Vec<Category>,
    pub all_parent: Vec<RootCategory>,
    pub all_with_sub: Vec<ResolvedCategory>,
}

impl CategoryTree {
    /// Look up a category in the fully resolved view.
    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&ResolvedCategory> {
        self.all_with_sub.iter().find(|c| c.category.id == id)
    }

    /// Names from the root down to `id` (inclusive).
    ///
    /// Returns an empty list for unknown IDs.
    #[must_use]
    pub fn breadcrumbs(&self, id: CategoryId) -> Vec<&str> {
        let Some(resolved) = self.find(id) else {
            return Vec::new();
        };

        let mut names: Vec<&str> = resolved
            .category_parent
            .iter()
            .flat_map(AncestorChain::iter)
            .map(Category::name)
            .collect();
        names.reverse();
        names.push(resolved.category.name());
        names
    }
}

/// Lookup tables over the flat category list.
struct CategoryIndex<'a> {
    by_id: HashMap<CategoryId, &'a Category>,
    children: HashMap<CategoryId, Vec<&'a Category>>,
}

impl<'a> CategoryIndex<'a> {
    fn build(categories: &'a [Category]) -> Result<Self, CategoryError> {
        let mut by_id = HashMap::with_capacity(categories.len());
        for category in categories {
            // Duplicate IDs: first occurrence wins.
            by_id.entry(category.id).or_insert(category);
        }

        let mut children: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
        for category in categories {
            if let Some(parent_id) = category.parent_id {
                if !by_id.contains_key(&parent_id) {
                    return Err(CategoryError::MissingParent {
                        category_id: category.id,
                        parent_id,
                    });
                }
                children.entry(parent_id).or_default().push(category);
            }
        }

        Ok(Self { by_id, children })
    }

    fn children_of(&self, id: CategoryId) -> &[&'a Category] {
        self.children
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Parent, grandparent, ... up to the root.
    fn ancestors(&self, category: &Category) -> Result<Vec<&'a Category>, CategoryError> {
        let mut visited = HashSet::from([category.id]);
        let mut ancestors = Vec::new();
        let mut next = category.parent_id;

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                return Err(CategoryError::Cycle {
                    category_id: parent_id,
                });
            }
            let parent = self
                .by_id
                .get(&parent_id)
                .copied()
                .ok_or(CategoryError::MissingParent {
                    category_id: category.id,
                    parent_id,
                })?;
            ancestors.push(parent);
            next = parent.parent_id;
        }

        Ok(ancestors)
    }

    fn chain(&self, category: &Category) -> Result<Option<AncestorChain>, CategoryError> {
        let ancestors = self.ancestors(category)?;
        Ok(ancestors.into_iter().rev().fold(None, |above, c| {
            Some(AncestorChain {
                category: c.clone(),
                category_parent: above.map(Box::new),
            })
        }))
    }
}

/// Derive the nested category views from a flat list.
///
/// # Errors
///
/// Returns [`CategoryError::MissingParent`] if a `parent_id` is not in
/// `categories`, or [`CategoryError::Cycle`] if a parent chain loops.
pub fn organize_categories(categories: &[Category]) -> Result<CategoryTree, CategoryError> {
    let index = CategoryIndex::build(categories)?;
    let roots: Vec<&Category> = categories.iter().filter(|c| c.is_root()).collect();

    let mut parents_with_children = Vec::new();
    let mut parents_without_children = Vec::new();
    for root in &roots {
        let children = index.children_of(root.id);
        if children.is_empty() {
            parents_without_children.push((*root).clone());
        } else {
            parents_with_children.push(ParentWithChildren {
                category: (*root).clone(),
                children: children.iter().map(|c| (*c).clone()).collect(),
            });
        }
    }

    let all_parent = roots
        .iter()
        .map(|root| RootCategory {
            category: (*root).clone(),
            sub_category: index
                .children_of(root.id)
                .iter()
                .map(|child| SubCategory {
                    category: (*child).clone(),
                    parent: (*root).clone(),
                })
                .collect(),
        })
        .collect();

    let all_with_sub = categories
        .iter()
        .map(|category| {
            let category_parent = index.chain(category)?;
            let back_reference = AncestorChain {
                category: category.clone(),
                category_parent: category_parent.clone().map(Box::new),
            };
            let children = index
                .children_of(category.id)
                .iter()
                .map(|child| ChildCategory {
                    category: (*child).clone(),
                    category_parent: back_reference.clone(),
                })
                .collect();

            Ok(ResolvedCategory {
                category: category.clone(),
                category_parent,
                children,
            })
        })
        .collect::<Result<Vec<_>, CategoryError>>()?;

    Ok(CategoryTree {
        parents_with_children,
        parents_without_children,
        all_parent,
        all_with_sub,
    })
}
