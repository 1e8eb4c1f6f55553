//! In-memory stand-in for the api-server, for multi-step scenarios where a scripted mock
//! would have to replay the server's bookkeeping.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use apiserver_provider_core::contract::{ClientError, PeopleClient, Person};
use async_trait::async_trait;

#[derive(Default)]
pub struct InMemoryPeople {
    people: Mutex<BTreeMap<i64, Person>>,
    next_id: Mutex<i64>,
    calls: AtomicUsize,
}

impl InMemoryPeople {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of client calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self, id: i64) -> Option<Person> {
        self.people.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.people.lock().unwrap().len()
    }

    fn not_found(id: i64) -> ClientError {
        format!("person {id} not found").into()
    }
}

#[async_trait]
impl PeopleClient for InMemoryPeople {
    async fn create(&self, person: Person) -> Result<Person, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut next = self.next_id.lock().unwrap();
        let stored = Person { id: *next, ..person };
        *next += 1;
        self.people.lock().unwrap().insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Person, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.stored(id).ok_or_else(|| Self::not_found(id))
    }

    async fn update(&self, id: i64, person: Person) -> Result<Person, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut people = self.people.lock().unwrap();
        let slot = people.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        *slot = Person { id, ..person };
        Ok(slot.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.people
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}
