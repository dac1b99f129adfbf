//! Concurrent in-process registries for users, orders and contact messages.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contact::ContactMessage;
use crate::models::order::Order;
use crate::models::user::{NewUser, User};

#[derive(Clone, Default)]
pub struct UserStore {
    by_email: Arc<DashMap<String, User>>,
    ruts: Arc<DashMap<String, String>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user, enforcing unique email and RUT.
    pub fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        // Claim the RUT first so two registrations racing on it cannot both win.
        match self.ruts.entry(new_user.rut.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict("RUT is already registered".to_string()));
            }
            Entry::Vacant(entry) => {
                entry.insert(new_user.email.clone());
            }
        }

        match self.by_email.entry(new_user.email.clone()) {
            Entry::Occupied(_) => {
                self.ruts.remove(&new_user.rut);
                Err(AppError::Conflict(
                    "email is already registered".to_string(),
                ))
            }
            Entry::Vacant(entry) => {
                let user = new_user.into_user();
                entry.insert(user.clone());
                Ok(user)
            }
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.by_email.get(email).map(|user| user.clone())
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct OrderStore {
    by_user: Arc<DashMap<Uuid, Vec<Order>>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) -> Order {
        self.by_user
            .entry(order.user_id)
            .or_default()
            .push(order.clone());
        order
    }

    /// Orders for a user, newest first.
    pub fn list_for(&self, user_id: Uuid) -> Vec<Order> {
        let mut orders = self
            .by_user
            .get(&user_id)
            .map(|orders| orders.clone())
            .unwrap_or_default();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

#[derive(Clone, Default)]
pub struct ContactInbox {
    messages: Arc<DashMap<Uuid, ContactMessage>>,
}

impl ContactInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: ContactMessage) -> Uuid {
        let id = message.id;
        self.messages.insert(id, message);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<ContactMessage> {
        self.messages.get(&id).map(|message| message.clone())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use chrono::Utc;

    fn new_user(rut: &str, email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            surname: None,
            rut: rut.to_string(),
            check_digit: '5',
            email: email.to_string(),
            phone: "912345678".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let store = UserStore::new();
        let user = store.insert(new_user("12345678", "ana@duoc.cl")).unwrap();
        assert_eq!(store.find_by_email("ana@duoc.cl").unwrap().id, user.id);
        assert!(store.find_by_email("otro@duoc.cl").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_rut_conflicts() {
        let store = UserStore::new();
        store.insert(new_user("12345678", "ana@duoc.cl")).unwrap();
        let err = store
            .insert(new_user("12345678", "otra@duoc.cl"))
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_email_releases_rut() {
        let store = UserStore::new();
        store.insert(new_user("12345678", "ana@duoc.cl")).unwrap();
        assert!(store.insert(new_user("11111111", "ana@duoc.cl")).is_err());
        // The RUT of the rejected registration is free again.
        assert!(store.insert(new_user("11111111", "luis@duoc.cl")).is_ok());
    }

    #[test]
    fn test_orders_listed_newest_first() {
        let store = OrderStore::new();
        let user_id = Uuid::new_v4();
        let order = |offset: i64| Order {
            id: Uuid::new_v4(),
            user_id,
            lines: Vec::<CartLine>::new(),
            total: 0,
            formatted_total: "$0".to_string(),
            created_at: Utc::now() + chrono::Duration::seconds(offset),
        };

        let older = store.insert(order(0));
        let newer = store.insert(order(10));

        let listed = store.list_for(user_id);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert!(store.list_for(Uuid::new_v4()).is_empty());
    }
}
