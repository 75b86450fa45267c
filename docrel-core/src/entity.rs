//! Entity kinds and their collections

use std::fmt;

/// Every kind of document the two domains store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Dealer,
    Car,
    Salesperson,
    Author,
    Book,
    User,
}

impl EntityKind {
    /// Collection holding documents of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Dealer => "Dealers",
            Self::Car => "Cars",
            Self::Salesperson => "Salespeople",
            Self::Author => "Authors",
            Self::Book => "Books",
            Self::User => "Users",
        }
    }

    /// Lowercase name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dealer => "dealer",
            Self::Car => "car",
            Self::Salesperson => "salesperson",
            Self::Author => "author",
            Self::Book => "book",
            Self::User => "user",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Self::Dealer => "dealers",
            Self::Car => "cars",
            Self::Salesperson => "salespeople",
            Self::Author => "authors",
            Self::Book => "books",
            Self::User => "users",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
