//! Single-identity admin check

use crate::db::UserId;

/// Grants admin mode to exactly one configured identity
#[derive(Debug, Clone, Copy)]
pub struct AdminGate {
    privileged: UserId,
}

impl AdminGate {
    pub fn new(privileged: UserId) -> Self {
        Self { privileged }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        user == self.privileged
    }
}
