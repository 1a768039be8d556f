//! Automatic created/updated timestamps for stored documents.
//!
//! Documents opt in by implementing [`Timestamped`]. Storage adapters call
//! [`stamp_insert`] before an insert and [`stamp_update`] before an update;
//! documents without the trait are written untouched.

use chrono::{DateTime, Utc};

/// Document with created/updated timestamps
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn set_created_at(&mut self, at: DateTime<Utc>);
    fn updated_at(&self) -> Option<DateTime<Utc>>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// Stamp a document about to be inserted.
///
/// `created_at` is only set when missing, so re-inserting a copied document
/// keeps its original creation time.
pub fn stamp_insert<T: Timestamped + ?Sized>(doc: &mut T) {
    stamp_insert_at(doc, Utc::now());
}

pub fn stamp_insert_at<T: Timestamped + ?Sized>(doc: &mut T, now: DateTime<Utc>) {
    if doc.created_at().is_none() {
        doc.set_created_at(now);
    }
    doc.set_updated_at(now);
}

/// Stamp a batch with a single shared timestamp
pub fn stamp_insert_many<T: Timestamped>(docs: &mut [T]) {
    let now = Utc::now();
    for doc in docs {
        stamp_insert_at(doc, now);
    }
}

/// Stamp a document about to be updated
pub fn stamp_update<T: Timestamped + ?Sized>(doc: &mut T) {
    doc.set_updated_at(Utc::now());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Default)]
    struct User {
        created: Option<DateTime<Utc>>,
        updated: Option<DateTime<Utc>>,
    }

    impl Timestamped for User {
        fn created_at(&self) -> Option<DateTime<Utc>> {
            self.created
        }
        fn set_created_at(&mut self, at: DateTime<Utc>) {
            self.created = Some(at);
        }
        fn updated_at(&self) -> Option<DateTime<Utc>> {
            self.updated
        }
        fn set_updated_at(&mut self, at: DateTime<Utc>) {
            self.updated = Some(at);
        }
    }

    #[test]
    fn test_insert_sets_both() {
        let mut user = User::default();
        stamp_insert(&mut user);

        assert!(user.created_at().is_some());
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn test_insert_keeps_existing_created_at() {
        let original = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut user = User {
            created: Some(original),
            updated: None,
        };
        stamp_insert(&mut user);

        assert_eq!(user.created_at(), Some(original));
        assert!(user.updated_at().unwrap() > original);
    }

    #[test]
    fn test_update_only_touches_updated_at() {
        let mut user = User::default();
        stamp_update(&mut user);

        assert!(user.created_at().is_none());
        assert!(user.updated_at().is_some());
    }

    #[test]
    fn test_insert_many_shares_timestamp() {
        let mut users = vec![User::default(), User::default()];
        stamp_insert_many(&mut users);

        assert!(users[0].updated_at().is_some());
        assert_eq!(users[0].updated_at(), users[1].updated_at());
    }
}
