//! Scripted provider used by the reconciler integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ghp_core::{Error, ObjectMeta, Repo, RepoSpec, Result};
use ghp_reconciler::{Connector, EventReason, ExternalClient, ExternalObservation};

/// Remote state plus queued failures, shared by every client it hands out.
#[derive(Debug, Default)]
pub struct FakeRemote {
    pub exists: bool,
    pub up_to_date: bool,
    pub connect_errors: VecDeque<Error>,
    pub observe_errors: VecDeque<Error>,
    pub create_errors: VecDeque<Error>,
    pub delete_errors: VecDeque<Error>,
    pub observe_note: Option<(EventReason, &'static str)>,
    pub calls: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub remote: Arc<Mutex<FakeRemote>>,
}

impl FakeConnector {
    pub fn with_remote(exists: bool, up_to_date: bool) -> Self {
        let connector = Self::default();
        {
            let mut remote = connector.remote.lock().unwrap();
            remote.exists = exists;
            remote.up_to_date = up_to_date;
        }
        connector
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.remote.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn exists(&self) -> bool {
        self.remote.lock().unwrap().exists
    }

    pub fn fail_next_create(&self, error: Error) {
        self.remote.lock().unwrap().create_errors.push_back(error);
    }

    pub fn fail_next_connect(&self, error: Error) {
        self.remote.lock().unwrap().connect_errors.push_back(error);
    }

    pub fn fail_next_observe(&self, error: Error) {
        self.remote.lock().unwrap().observe_errors.push_back(error);
    }

    pub fn fail_next_delete(&self, error: Error) {
        self.remote.lock().unwrap().delete_errors.push_back(error);
    }

    pub fn note_on_observe(&self, reason: EventReason, message: &'static str) {
        self.remote.lock().unwrap().observe_note = Some((reason, message));
    }

    pub fn drift(&self) {
        self.remote.lock().unwrap().up_to_date = false;
    }
}

pub struct FakeClient {
    remote: Arc<Mutex<FakeRemote>>,
}

#[async_trait]
impl Connector<Repo> for FakeConnector {
    type External = FakeClient;

    async fn connect(&self, _resource: &Repo) -> Result<FakeClient> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push("connect");
        match remote.connect_errors.pop_front() {
            Some(e) => Err(e),
            None => Ok(FakeClient {
                remote: Arc::clone(&self.remote),
            }),
        }
    }
}

#[async_trait]
impl ExternalClient<Repo> for FakeClient {
    async fn exists(&self, _resource: &Repo) -> Result<bool> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push("exists");
        Ok(remote.exists)
    }

    async fn observe(&self, resource: &mut Repo) -> Result<ExternalObservation> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push("observe");
        if let Some(e) = remote.observe_errors.pop_front() {
            return Err(e);
        }
        if !remote.exists {
            return Ok(ExternalObservation::missing());
        }
        resource.status.private = Some(resource.spec.private);
        let observation = if remote.up_to_date {
            ExternalObservation::up_to_date()
        } else {
            ExternalObservation::drifted()
        };
        Ok(match remote.observe_note {
            Some((reason, message)) => observation.with_note(reason, message),
            None => observation,
        })
    }

    async fn create(&self, _resource: &Repo) -> Result<()> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push("create");
        if let Some(e) = remote.create_errors.pop_front() {
            return Err(e);
        }
        remote.exists = true;
        remote.up_to_date = true;
        Ok(())
    }

    async fn update(&self, _resource: &Repo) -> Result<()> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push("update");
        remote.up_to_date = true;
        Ok(())
    }

    async fn delete(&self, _resource: &Repo) -> Result<()> {
        let mut remote = self.remote.lock().unwrap();
        remote.calls.push("delete");
        if let Some(e) = remote.delete_errors.pop_front() {
            return Err(e);
        }
        remote.exists = false;
        Ok(())
    }
}

pub fn repo(name: &str) -> Repo {
    Repo::new(
        ObjectMeta::new("default", name),
        RepoSpec {
            org: "acme".into(),
            name: name.into(),
            ..Default::default()
        },
    )
}
