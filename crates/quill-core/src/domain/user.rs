use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permission level carried by every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May write, edit and delete posts.
    Admin,
    /// May read and comment.
    Reader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Reader => "reader",
        }
    }

    /// Role granted to a new account given how many accounts already exist.
    /// The first account registered owns the blog.
    pub fn for_new_account(existing_accounts: u64) -> Self {
        if existing_accounts == 0 {
            Role::Admin
        } else {
            Role::Reader
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "reader" => Ok(Role::Reader),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// User entity - a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Data needed to register an account. The role is decided by the repository
/// at insert time.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
