//! Privileged roles on the ledger

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use dao_core::Address;

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Grants and revokes roles
    Admin,
    /// Mints snapshot boundaries
    Snapshotter,
    /// Runs the batch weight grant
    WeightGranter,
}

#[derive(Debug, Clone, Default)]
pub struct Roles {
    members: HashMap<Role, HashSet<Address>>,
}

impl Roles {
    /// Role set where `admin` holds every role
    pub fn with_admin(admin: Address) -> Self {
        let mut roles = Self::default();
        for role in [Role::Admin, Role::Snapshotter, Role::WeightGranter] {
            roles.insert(role, admin);
        }
        roles
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .is_some_and(|members| members.contains(account))
    }

    pub fn require(&self, role: Role, account: &Address) -> Result<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                account: *account,
                role,
            })
        }
    }

    pub(crate) fn insert(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    pub(crate) fn remove(&mut self, role: Role, account: &Address) -> bool {
        self.members
            .get_mut(&role)
            .is_some_and(|members| members.remove(account))
    }
}
