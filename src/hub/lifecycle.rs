//! Processor creation and session connection workflows
//!
//! Both workflows run the authorization gate and every lookup before
//! touching shared state, so a refused request leaves the registries exactly
//! as they were.
//!
//! Creation walks through four steps:
//!
//! 1. Authorize: unprivileged callers may only create non-persistent
//!    processors of the replay type, attaching only their own sessions.
//! 2. Construct: the key is reserved, then the factory builds the processor,
//!    which is registered under it.
//! 3. Attach: each listed live session is switched onto it.
//! 4. Commit or abort: start and wait for `Running` if anything is attached
//!    or the processor is persistent; otherwise tear it down.

use std::sync::Arc;
use std::time::Duration;

use super::ManagementHub;
use crate::auth::{resolve_principal, AuthToken, SystemPrivilege};
use crate::bridge::BridgeEntity;
use crate::error::{ManagementError, ProcessorError, Result};
use crate::listener::ManagementEvent;
use crate::processor::{
    Processor, ProcessorConfig, ProcessorInfo, ProcessorSpec, ProcessorState, ReplaySpec,
};
use crate::registry::ProcessorKey;

/// Request to create a new processor
#[derive(Debug, Clone, Default)]
pub struct CreateProcessorRequest {
    pub instance: String,
    pub name: String,
    pub processor_type: String,
    /// Generic configuration; exclusive with `replay_spec`
    pub config: Option<String>,
    /// Replay configuration; exclusive with `config`
    pub replay_spec: Option<ReplaySpec>,
    pub persistent: bool,
    /// Sessions to attach to the new processor
    pub client_ids: Vec<u32>,
    /// Override of the configured start timeout
    pub start_timeout: Option<Duration>,
}

impl CreateProcessorRequest {
    pub fn new(
        instance: impl Into<String>,
        name: impl Into<String>,
        processor_type: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            name: name.into(),
            processor_type: processor_type.into(),
            ..Default::default()
        }
    }

    pub fn config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn replay(mut self, spec: ReplaySpec) -> Self {
        self.replay_spec = Some(spec);
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn clients(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.client_ids = ids.into_iter().collect();
        self
    }

    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = Some(timeout);
        self
    }

    fn key(&self) -> ProcessorKey {
        ProcessorKey::new(&self.instance, &self.name)
    }

    fn processor_config(&self) -> Result<Option<ProcessorConfig>> {
        match (&self.config, &self.replay_spec) {
            (Some(_), Some(_)) => Err(ManagementError::invalid(
                "both a generic config and a replay spec were supplied",
            )),
            (None, Some(spec)) => Ok(Some(ProcessorConfig::Replay(spec.clone()))),
            (Some(config), None) => Ok(Some(ProcessorConfig::Generic(config.clone()))),
            (None, None) => Ok(None),
        }
    }
}

/// Request to attach sessions to an existing processor
#[derive(Debug, Clone, Default)]
pub struct ConnectSessionsRequest {
    pub instance: String,
    pub name: String,
    pub client_ids: Vec<u32>,
}

impl ConnectSessionsRequest {
    pub fn new(
        instance: impl Into<String>,
        name: impl Into<String>,
        client_ids: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            instance: instance.into(),
            name: name.into(),
            client_ids: client_ids.into_iter().collect(),
        }
    }
}

/// Session moved during creation, with the processor it came from
struct Attached {
    id: u32,
    previous: Arc<dyn Processor>,
}

impl ManagementHub {
    /// Create, populate and start a new processor
    pub async fn create_processor(
        &self,
        request: CreateProcessorRequest,
        token: Option<&AuthToken>,
    ) -> Result<ProcessorInfo> {
        let key = request.key();
        let username = resolve_principal(token, &self.config.default_user);
        tracing::info!(
            processor = %key,
            processor_type = %request.processor_type,
            persistent = request.persistent,
            clients = ?request.client_ids,
            username = %username,
            "Creating processor"
        );

        if !self
            .authorizer
            .has_privilege(token, SystemPrivilege::ControlProcessor)
        {
            self.check_unprivileged_create(&request, &username).await?;
        }

        let config = request.processor_config()?;
        // Held until the processor is registered so concurrent creations
        // of the same key cannot both reach the factory
        if !self.processors.reserve(&key).await {
            return Err(ManagementError::invalid(format!(
                "processor {} already exists",
                key
            )));
        }

        let processor = match self.factory.create(ProcessorSpec {
            key: key.clone(),
            processor_type: request.processor_type.clone(),
            creator: username.clone(),
            config,
        }) {
            Ok(processor) => processor,
            Err(e) => {
                self.processors.release(&key).await;
                return Err(e.into());
            }
        };
        processor.set_persistent(request.persistent);
        self.on_processor_added(Arc::clone(&processor)).await;

        let attached = match self
            .attach_sessions(&processor, &request.client_ids, &username)
            .await
        {
            Ok(attached) => attached,
            Err(e) => {
                self.teardown(&processor).await;
                return Err(e);
            }
        };

        if attached.is_empty() && !request.persistent {
            self.teardown(&processor).await;
            return Err(ManagementError::invalid(
                "none of the listed client ids could be attached to a non-persistent processor",
            ));
        }

        tracing::info!(
            processor = %key,
            clients = attached.len(),
            "Starting processor"
        );
        let timeout = request.start_timeout.unwrap_or(self.config.start_timeout);
        if let Err(e) = self.start_and_wait(processor.as_ref(), timeout).await {
            tracing::warn!(processor = %key, error = %e, "Processor failed to start");
            self.detach_sessions(&attached).await;
            self.teardown(&processor).await;
            return Err(e);
        }

        Ok(self.snapshot_processor(processor.as_ref()).await)
    }

    /// Move sessions onto an existing processor
    pub async fn connect_sessions(
        &self,
        request: ConnectSessionsRequest,
        token: Option<&AuthToken>,
    ) -> Result<()> {
        let key = ProcessorKey::new(&request.instance, &request.name);
        let processor = self
            .processors
            .get(&key)
            .await
            .ok_or_else(|| ManagementError::not_found(format!("processor {}", key)))?;

        let username = resolve_principal(token, &self.config.default_user);
        tracing::debug!(
            processor = %key,
            clients = ?request.client_ids,
            username = %username,
            "Connect sessions requested"
        );

        let privileged = self
            .authorizer
            .has_privilege(token, SystemPrivilege::ControlProcessor);
        if !privileged && !(processor.is_persistent() || processor.creator() == username) {
            tracing::warn!(
                processor = %key,
                username = %username,
                "User not allowed to connect sessions to processor"
            );
            return Err(ManagementError::denied(format!(
                "{} may not connect sessions to processor {}",
                username, key
            )));
        }

        for &id in &request.client_ids {
            let info = self
                .sessions
                .info(id)
                .await
                .ok_or_else(|| ManagementError::not_found(format!("client {}", id)))?;
            if !privileged && info.username != username {
                tracing::warn!(
                    processor = %key,
                    username = %username,
                    owner = %info.username,
                    session_id = id,
                    "User not allowed to connect another user's session"
                );
                return Err(ManagementError::denied(format!(
                    "{} may not connect client {} owned by {}",
                    username, id, info.username
                )));
            }
        }

        for &id in &request.client_ids {
            self.switch_processor(id, &processor, &username).await?;
        }
        Ok(())
    }

    /// Switch one session onto `processor` and announce the change
    ///
    /// Callers must have passed the connection authorization gate. Returns
    /// the processor the session was attached to before, or `None` if the
    /// session does not exist.
    pub(crate) async fn switch_processor(
        &self,
        id: u32,
        processor: &Arc<dyn Processor>,
        caller: &str,
    ) -> Result<Option<Arc<dyn Processor>>> {
        let Some(outcome) = self.sessions.switch(id, Arc::clone(processor)).await? else {
            return Ok(None);
        };

        self.withdraw(self.client_name(&outcome.before));
        self.expose(
            self.client_name(&outcome.after),
            BridgeEntity::Client(outcome.after.clone()),
        );

        tracing::info!(
            session_id = id,
            from = %outcome.previous.key(),
            to = %processor.key(),
            caller = caller,
            "Session switched processor"
        );
        self.listeners
            .notify_management(ManagementEvent::SessionInfoChanged(outcome.after))
            .await;

        Ok(Some(outcome.previous))
    }

    async fn check_unprivileged_create(
        &self,
        request: &CreateProcessorRequest,
        username: &str,
    ) -> Result<()> {
        if request.persistent {
            tracing::warn!(username = %username, "User not allowed to create persistent processors");
            return Err(ManagementError::denied(format!(
                "{} may not create persistent processors",
                username
            )));
        }
        if request.processor_type != self.config.replay_processor_type {
            tracing::warn!(
                username = %username,
                processor_type = %request.processor_type,
                "User not allowed to create processors of this type"
            );
            return Err(ManagementError::denied(format!(
                "{} may not create processors of type {}",
                username, request.processor_type
            )));
        }
        for &id in &request.client_ids {
            // Unknown ids are skipped later by the attach step
            let Some(info) = self.sessions.info(id).await else {
                continue;
            };
            if info.username != username {
                tracing::warn!(
                    username = %username,
                    owner = %info.username,
                    session_id = id,
                    processor = %request.name,
                    "User not allowed to attach another user's session"
                );
                return Err(ManagementError::denied(format!(
                    "{} may not attach client {} owned by {}",
                    username, id, info.username
                )));
            }
        }
        Ok(())
    }

    async fn attach_sessions(
        &self,
        processor: &Arc<dyn Processor>,
        ids: &[u32],
        caller: &str,
    ) -> Result<Vec<Attached>> {
        let mut attached = Vec::new();
        for &id in ids {
            match self.switch_processor(id, processor, caller).await {
                Ok(Some(previous)) => attached.push(Attached { id, previous }),
                Ok(None) => {
                    tracing::warn!(
                        session_id = id,
                        processor = %processor.key(),
                        "Invalid client id, ignored"
                    );
                }
                Err(e) => {
                    self.detach_sessions(&attached).await;
                    return Err(e);
                }
            }
        }
        Ok(attached)
    }

    /// Return sessions to the processor they came from, when it is still live
    async fn detach_sessions(&self, attached: &[Attached]) {
        for session in attached {
            let key = session.previous.key();
            if !self.processors.contains(key).await {
                tracing::warn!(
                    session_id = session.id,
                    processor = %key,
                    "Previous processor gone, session left in place"
                );
                continue;
            }
            if let Err(e) = self
                .switch_processor(session.id, &session.previous, "rollback")
                .await
            {
                tracing::warn!(session_id = session.id, error = %e, "Failed to restore session");
            }
        }
    }

    async fn start_and_wait(&self, processor: &dyn Processor, timeout: Duration) -> Result<()> {
        let mut state = processor.watch_state();
        processor.start()?;

        let reached = tokio::time::timeout(
            timeout,
            state.wait_for(|s| *s == ProcessorState::Running || s.is_final()),
        )
        .await;

        match reached {
            Ok(Ok(s)) if *s == ProcessorState::Running => Ok(()),
            Ok(Ok(s)) => {
                let final_state = *s;
                Err(ManagementError::from(ProcessorError::new(format!(
                    "processor {} stopped while starting ({})",
                    processor.key(),
                    final_state
                ))))
            }
            Ok(Err(e)) => Err(ManagementError::from(ProcessorError::with_source(
                format!("processor {} dropped its state channel", processor.key()),
                e,
            ))),
            Err(_) => Err(ManagementError::construction(
                format!(
                    "processor {} did not report running within {:?}",
                    processor.key(),
                    timeout
                ),
                None,
            )),
        }
    }

    /// Quit a processor and drop it from the registries
    async fn teardown(&self, processor: &Arc<dyn Processor>) {
        processor.quit();
        self.on_processor_closed(processor.key()).await;
    }
}
