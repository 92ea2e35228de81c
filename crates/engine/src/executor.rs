//! The command executor - single entry point to the pipeline
//!
//! Built once from an [`ExecutorBuilder`]; `Send + Sync` and shared by every
//! caller thread. Each top-level [`CommandExecutor::execute`] runs in its own
//! unit of work. Commands nest through [`CommandExecutor::execute_nested`],
//! which shares the caller's unit of work.

use std::sync::Arc;

use cadence_concurrency::{EntityStore, ExternalResource, ResourceSessionFactory, SessionFactory};
use cadence_core::{Caller, DefinitionRepository, EngineResult};
use tracing::info;

use crate::authorization::{AuthorizationProvider, Authorizer, GrantTable};
use crate::command::Command;
use crate::config::EngineConfig;
use crate::context::{CommandContext, EngineServices};
use crate::interceptor::{
    AuthorizationInterceptor, Chain, ContextInterceptor, Handler, Invocation, LoggingInterceptor,
    RetryInterceptor, Terminal,
};
use crate::state_machine::RelationRules;

type Pipeline = Chain<
    LoggingInterceptor,
    Chain<RetryInterceptor, Chain<ContextInterceptor, Chain<AuthorizationInterceptor, Terminal>>>,
>;

/// Runs commands through the interceptor chain
pub struct CommandExecutor {
    services: Arc<EngineServices>,
    pipeline: Pipeline,
}

impl CommandExecutor {
    /// Start building an executor
    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::default()
    }

    /// Executor over `services`, checking grants through `provider`
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn new(services: EngineServices, provider: Arc<dyn AuthorizationProvider>) -> EngineResult<Self> {
        services.config().validate()?;
        let services = Arc::new(services);
        let config = services.config();

        let pipeline = Chain::new(
            LoggingInterceptor,
            Chain::new(
                RetryInterceptor::new(config.max_attempts),
                Chain::new(
                    ContextInterceptor::new(Arc::clone(&services)),
                    Chain::new(
                        AuthorizationInterceptor::new(Authorizer::new(
                            provider,
                            config.admin_groups.clone(),
                        )),
                        Terminal,
                    ),
                ),
            ),
        );

        info!(
            target: "cadence::executor",
            authorization = config.authorization_enabled,
            max_attempts = config.max_attempts,
            "Command executor ready"
        );
        Ok(Self { services, pipeline })
    }

    /// Run `command` for `caller` in a new unit of work
    pub fn execute<C: Command>(&self, command: &C, caller: &Caller) -> EngineResult<C::Output> {
        let mut invocation = Invocation::top_level(command, caller.clone());
        self.pipeline.handle(&mut invocation, self)
    }

    /// Run `command` inside the active unit of work `context`
    ///
    /// Permission checks run unless disabled on `context`. Nothing is
    /// flushed; the outermost invocation commits or rolls back.
    pub fn execute_nested<C: Command>(
        &self,
        command: &C,
        context: &mut CommandContext,
    ) -> EngineResult<C::Output> {
        let mut invocation = Invocation::nested(command, context);
        self.pipeline.handle(&mut invocation, self)
    }

    /// Shared engine services
    pub fn services(&self) -> &Arc<EngineServices> {
        &self.services
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        self.services.config()
    }

    /// Shared entity store
    pub fn store(&self) -> &Arc<EntityStore> {
        self.services.store()
    }
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("services", &self.services)
            .finish()
    }
}

/// Builder for [`CommandExecutor`]
#[derive(Default)]
pub struct ExecutorBuilder {
    config: EngineConfig,
    store: Option<Arc<EntityStore>>,
    factories: Vec<Arc<dyn SessionFactory>>,
    resource: Option<Arc<dyn ExternalResource>>,
    definitions: Option<Arc<dyn DefinitionRepository>>,
    relation_rules: Option<Arc<dyn RelationRules>>,
    authorization: Option<Arc<dyn AuthorizationProvider>>,
}

impl ExecutorBuilder {
    /// Use `config`
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Share `store` instead of creating a fresh one
    pub fn with_store(mut self, store: Arc<EntityStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register an additional session factory
    pub fn with_session_factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Register a resource session over `resource`
    ///
    /// Transaction handling follows `[resource] handle_transactions`.
    pub fn with_resource(mut self, resource: Arc<dyn ExternalResource>) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Use `definitions` for case definitions
    pub fn with_definitions(mut self, definitions: Arc<dyn DefinitionRepository>) -> Self {
        self.definitions = Some(definitions);
        self
    }

    /// Replace the default case relation rules
    pub fn with_relation_rules(mut self, rules: Arc<dyn RelationRules>) -> Self {
        self.relation_rules = Some(rules);
        self
    }

    /// Check grants through `provider`; defaults to an empty [`GrantTable`]
    pub fn with_authorization(mut self, provider: Arc<dyn AuthorizationProvider>) -> Self {
        self.authorization = Some(provider);
        self
    }

    /// Build the executor
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn build(self) -> EngineResult<CommandExecutor> {
        let store = self.store.unwrap_or_default();
        let handle_transactions = self.config.resource.handle_transactions;
        let mut services = EngineServices::new(self.config, store);

        for factory in self.factories {
            services = services.with_session_factory(factory);
        }
        if let Some(resource) = self.resource {
            services = services.with_session_factory(Arc::new(ResourceSessionFactory::new(
                resource,
                handle_transactions,
            )));
        }
        if let Some(definitions) = self.definitions {
            services = services.with_definitions(definitions);
        }
        if let Some(rules) = self.relation_rules {
            services = services.with_relation_rules(rules);
        }

        let provider = self
            .authorization
            .unwrap_or_else(|| Arc::new(GrantTable::new()));
        CommandExecutor::new(services, provider)
    }
}
