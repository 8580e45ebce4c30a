//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::command_name;
use crate::cli::parse::{ClusterCommands, Commands, HotbarCommands};
use crate::cli::presentation::{
    format_cluster_list, format_contexts, format_deletion_report, format_hotbars,
};
use crate::cluster::{ClusterId, ClusterRecord, ClusterRegistry, JsonClusterStorage, SharedClusterRegistry};
use crate::config::{ConfigLoader, DeckConfig};
use crate::deletion::{
    ContextReassignmentResolver, DeletionCoordinator, DeletionOutcome, DialoguerResolver,
    PresetResolver,
};
use crate::error::{ApiError, StorageError};
use crate::hotbar::HotbarStore;
use crate::ipc::RegistryServer;
use crate::kubeconfig::{ConfigFileStore, FsConfigFileStore, KubeConfig, ReassignmentChoice};
use crate::lock::LockManager;
use crate::notify::{Notifier, TerminalNotifier};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: loaded config, registry and hotbars.
/// Built from an optional config path using ConfigLoader only.
pub struct RunContext {
    config: DeckConfig,
    registry: SharedClusterRegistry,
    hotbars: Arc<HotbarStore>,
    store: Arc<dyn ConfigFileStore>,
    notifier: Arc<dyn Notifier>,
}

impl RunContext {
    /// Create run context from an optional config path.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Self::from_config(config)
    }

    /// Create run context from an already loaded config.
    pub fn from_config(config: DeckConfig) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        let paths = config.storage.resolve_paths()?;
        debug!(
            clusters = %paths.clusters_file.display(),
            hotbar = %paths.hotbar_file.display(),
            "Resolved storage paths"
        );
        let storage = Arc::new(JsonClusterStorage::new(&paths.clusters_file));
        let registry = ClusterRegistry::load(storage)?.into_shared();
        let hotbars = Arc::new(HotbarStore::open(&paths.hotbar_file)?);
        let color = std::io::stderr().is_terminal();

        Ok(Self {
            config,
            registry,
            hotbars,
            store: Arc::new(FsConfigFileStore::new()),
            notifier: Arc::new(TerminalNotifier::new(color)),
        })
    }

    /// Replace the notification sink (tests capture messages this way).
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn registry(&self) -> &SharedClusterRegistry {
        &self.registry
    }

    pub fn hotbars(&self) -> &HotbarStore {
        &self.hotbars
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let name = command_name(command);
        info!(command = %name, "Executing command");
        match command {
            Commands::Cluster { command } => self.handle_cluster_command(command),
            Commands::Contexts { path, format } => {
                let doc = read_kubeconfig(path)?;
                format_contexts(&doc, format)
            }
            Commands::Hotbar { command } => self.handle_hotbar_command(command),
        }
    }

    fn handle_cluster_command(&self, command: &ClusterCommands) -> Result<String, ApiError> {
        match command {
            ClusterCommands::Add {
                kubeconfig,
                context,
            } => self.add_cluster(kubeconfig, context),
            ClusterCommands::List { format } => {
                let records = self.records();
                let deleting = self.registry.read().deleting();
                format_cluster_list(&records, &deleting, format)
            }
            ClusterCommands::Delete {
                id,
                yes,
                current_context,
                unset_current_context,
            } => {
                let preset = match (current_context, unset_current_context) {
                    (Some(name), _) => Some(ReassignmentChoice::Context(name.clone())),
                    (None, true) => Some(ReassignmentChoice::Unset),
                    (None, false) => None,
                };
                self.delete_cluster(&ClusterId::new(id.as_str()), *yes, preset)
            }
        }
    }

    fn handle_hotbar_command(&self, command: &HotbarCommands) -> Result<String, ApiError> {
        match command {
            HotbarCommands::Pin { id, hotbar } => {
                let id = self.known_cluster(id)?;
                if self.registry.read().is_deleting(&id) {
                    return Err(ApiError::Input(format!(
                        "Cluster {} is being deleted and cannot be pinned",
                        id
                    )));
                }
                if self.hotbars.pin(hotbar, &id)? {
                    Ok(format!("Pinned {} to hotbar \"{}\"", id, hotbar))
                } else {
                    Ok(format!("{} is already pinned to hotbar \"{}\"", id, hotbar))
                }
            }
            HotbarCommands::Unpin { id, hotbar } => {
                let id = ClusterId::new(id.as_str());
                if self.hotbars.unpin(hotbar, &id)? {
                    Ok(format!("Unpinned {} from hotbar \"{}\"", id, hotbar))
                } else {
                    Ok(format!("{} is not pinned to hotbar \"{}\"", id, hotbar))
                }
            }
            HotbarCommands::List { hotbar, format } => {
                let names = match hotbar {
                    Some(name) => vec![name.clone()],
                    None => self.hotbars.hotbar_names(),
                };
                let hotbars: Vec<_> = names
                    .into_iter()
                    .map(|name| {
                        let items = self.hotbars.items(&name);
                        (name, items)
                    })
                    .collect();
                format_hotbars(&hotbars, &self.records(), format)
            }
        }
    }

    fn add_cluster(&self, kubeconfig: &Path, context: &str) -> Result<String, ApiError> {
        let path = std::path::absolute(kubeconfig).map_err(StorageError::IoError)?;
        let doc = read_kubeconfig(&path)?;
        if !doc.has_context(context) {
            return Err(ApiError::ContextNotFound {
                path,
                context: context.to_string(),
            });
        }
        let record = ClusterRecord::new(path, context);
        let id = record.id.clone();
        let summary = format!(
            "Added cluster {} (\"{}\" from {})",
            id,
            record.context_name,
            record.kubeconfig_path.display()
        );
        self.registry.write().add(record)?;
        info!(cluster_id = %id, "Cluster registered");
        Ok(summary)
    }

    fn delete_cluster(
        &self,
        id: &ClusterId,
        yes: bool,
        preset: Option<ReassignmentChoice>,
    ) -> Result<String, ApiError> {
        let record = self
            .registry
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::ClusterNotFound(id.clone()))?;
        let interactive = self.config.deletion.interactive;

        if !yes {
            if !interactive {
                return Err(ApiError::Input(
                    "Refusing to delete without confirmation in non-interactive mode; pass --yes"
                        .to_string(),
                ));
            }
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(format!(
                    "Delete the \"{}\" context from \"{}\"?",
                    record.context_name,
                    record.kubeconfig_path.display()
                ))
                .default(false)
                .interact()
                .map_err(|e| ApiError::Input(format!("Failed to get user input: {}", e)))?;
            if !confirmed {
                return Ok("Deletion cancelled".to_string());
            }
        }

        let resolver: Arc<dyn ContextReassignmentResolver> = match preset {
            Some(choice) => Arc::new(PresetResolver::Choose(choice)),
            None if interactive => Arc::new(DialoguerResolver::new()),
            None => Arc::new(PresetResolver::Cancel),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StorageError::IoError)?;
        let report = runtime.block_on(async {
            let (client, server) = RegistryServer::new(self.registry.clone())
                .spawn(self.config.deletion.transport_timeout());
            let coordinator = DeletionCoordinator::new(
                self.registry.clone(),
                Arc::new(client),
                self.store.clone(),
                LockManager::new(),
                resolver,
                self.notifier.clone(),
            )
            .with_cleanup(self.hotbars.clone());
            let report = coordinator.delete_cluster(id).await;
            server.shutdown().await;
            report
        });

        match &report.outcome {
            DeletionOutcome::NotFound => Err(ApiError::ClusterNotFound(id.clone())),
            DeletionOutcome::Aborted(e) if !e.is_cancellation() => {
                Err(ApiError::DeletionAborted {
                    cluster_id: id.clone(),
                    reason: e.to_string(),
                })
            }
            _ => Ok(format_deletion_report(&report, &record)),
        }
    }

    fn known_cluster(&self, id: &str) -> Result<ClusterId, ApiError> {
        let id = ClusterId::new(id);
        if self.registry.read().get(&id).is_none() {
            return Err(ApiError::ClusterNotFound(id));
        }
        Ok(id)
    }

    fn records(&self) -> Vec<ClusterRecord> {
        self.registry.read().list().into_iter().cloned().collect()
    }
}

fn read_kubeconfig(path: &Path) -> Result<KubeConfig, ApiError> {
    let raw = std::fs::read_to_string(path).map_err(StorageError::IoError)?;
    Ok(KubeConfig::parse(&raw)?)
}
