use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::message::UserId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// "First Last", dropping whichever part is empty.
    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Two-tier user lookup: conversation-scoped entries first, then the
/// global contact table. Classification never fails on a missing user; the
/// actor name just falls back to empty.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    chat: HashMap<UserId, User>,
    global: HashMap<UserId, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_chat_user(&mut self, user: User) {
        self.chat.insert(user.id, user);
    }

    pub fn insert_global_user(&mut self, user: User) {
        self.global.insert(user.id, user);
    }

    pub fn lookup(&self, id: UserId) -> Option<&User> {
        self.chat.get(&id).or_else(|| self.global.get(&id))
    }

    /// Display name of a user, or `""` when unknown.
    pub fn name_of(&self, id: UserId) -> String {
        self.lookup(id).map(User::display_name).unwrap_or_default()
    }
}
