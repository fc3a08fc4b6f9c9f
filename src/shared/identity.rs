//! Identity and id generation collaborators
//!
//! Authentication lives outside this crate. The core only needs two things
//! from it: who the current caller is, and a way to mint ids that never
//! collide. Both are traits so sessions can plug in their own sources.

use crate::shared::message::Author;
use uuid::Uuid;

/// Yields the identity of the current caller, if any
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Author>;
}

/// Produces globally unique message ids
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Identity fixed for the lifetime of a session
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    author: Option<Author>,
}

impl StaticIdentity {
    pub fn new(author: Option<Author>) -> Self {
        Self { author }
    }

    pub fn signed_in(author: Author) -> Self {
        Self::new(Some(author))
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Option<Author> {
        self.author.clone().filter(Author::is_present)
    }
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
