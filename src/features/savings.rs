use std::fmt;

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SavingsError {
    #[error("Savings group not found - {0}")]
    GroupNotFound(GroupId),
}

pub type SavingsResult<T> = Result<T, SavingsError>;

/// The caller-supplied part of a group. Id and running total are assigned
/// on creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub target_amount: Decimal,
}

impl NewGroup {
    pub fn new(name: impl Into<String>, target_amount: Decimal) -> Self {
        Self {
            name: name.into(),
            target_amount,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGroup {
    id: GroupId,
    name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    target_amount: Decimal,

    /// Never negative
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    current_amount: Decimal,
}

impl SavingsGroup {
    fn create(group: NewGroup) -> Self {
        Self {
            id: GroupId::generate(),
            name: group.name,
            target_amount: group.target_amount,
            current_amount: dec!(0),
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_amount(&self) -> Decimal {
        self.target_amount
    }

    pub fn current_amount(&self) -> Decimal {
        self.current_amount
    }

    /// A negative contribution floors the total at zero instead of failing.
    /// Overflow saturates at `Decimal::MAX`.
    fn contribute(&self, amount: Decimal) -> Self {
        Self {
            current_amount: self.current_amount.saturating_add(amount).max(dec!(0)),
            ..self.clone()
        }
    }

    /// Restore the non-negative total on a group read back from storage.
    pub(crate) fn sanitized(self) -> Self {
        Self {
            current_amount: self.current_amount.max(dec!(0)),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavingsState {
    groups: Vec<SavingsGroup>,

    /// Lookup key into `groups`. May point at a group that no longer exists.
    active_group_id: Option<GroupId>,
}

impl SavingsState {
    pub(crate) fn from_parts(groups: Vec<SavingsGroup>, active_group_id: Option<GroupId>) -> Self {
        Self {
            groups,
            active_group_id,
        }
    }

    pub fn groups(&self) -> &[SavingsGroup] {
        &self.groups
    }

    pub fn active_group_id(&self) -> Option<&GroupId> {
        self.active_group_id.as_ref()
    }

    pub fn group(&self, id: &GroupId) -> Option<&SavingsGroup> {
        self.groups.iter().find(|group| &group.id == id)
    }

    /// Resolves the active pointer, `None` when unset or dangling.
    pub fn active_group(&self) -> Option<&SavingsGroup> {
        self.active_group_id.as_ref().and_then(|id| self.group(id))
    }

    pub(crate) fn add_group(&self, group: NewGroup) -> (Self, GroupId) {
        let group = SavingsGroup::create(group);
        let id = group.id.clone();

        let mut groups = self.groups.clone();
        groups.push(group);

        (
            Self {
                groups,
                ..self.clone()
            },
            id,
        )
    }

    pub(crate) fn contribute_to_group(&self, id: &GroupId, amount: Decimal) -> Self {
        self.try_contribute_to_group(id, amount)
            .unwrap_or_else(|_| self.clone())
    }

    pub(crate) fn try_contribute_to_group(
        &self,
        id: &GroupId,
        amount: Decimal,
    ) -> SavingsResult<Self> {
        if self.group(id).is_none() {
            return Err(SavingsError::GroupNotFound(id.clone()));
        }

        let groups = self
            .groups
            .iter()
            .map(|group| {
                if &group.id == id {
                    group.contribute(amount)
                } else {
                    group.clone()
                }
            })
            .collect();

        Ok(Self {
            groups,
            ..self.clone()
        })
    }

    pub(crate) fn set_active_group(&self, id: Option<GroupId>) -> Self {
        Self {
            active_group_id: id,
            ..self.clone()
        }
    }

    pub(crate) fn reset(&self) -> Self {
        Self::default()
    }
}
