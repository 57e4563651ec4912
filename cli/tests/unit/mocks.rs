//! Shared mock infrastructure for unit tests.
//!
//! `FakeCloud` is an in-memory `ComputeProvider` with per-operation failure
//! injection. The remaining mocks record what services asked of them.

#![allow(clippy::expect_used, dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Mutex;

use anyhow::Result;
use tins_cli::application::ports::{
    CommandRunner, ComputeProvider, InstanceRequest, InstanceSelector, KeyPair, KeyStore,
    ProgressReporter,
};
use tins_cli::domain::naming::{self, MANAGED_METADATA_KEY, MANAGED_METADATA_VALUE};
use tins_cli::domain::{
    InstanceAddress, InstanceIdentity, InstanceStatus, KeyError, ProviderError, RemoteInstance,
    ResourceKind,
};

// ── Instance builders ────────────────────────────────────────────────────────

/// Instance carrying the managed metadata flag.
pub fn managed(id: &str, name: &str) -> RemoteInstance {
    RemoteInstance {
        id: id.to_string(),
        name: name.to_string(),
        status: InstanceStatus::Active,
        metadata: HashMap::from([(
            MANAGED_METADATA_KEY.to_string(),
            MANAGED_METADATA_VALUE.to_string(),
        )]),
        addresses: BTreeMap::new(),
        created: None,
    }
}

/// Instance with no metadata at all.
pub fn unmanaged(id: &str, name: &str) -> RemoteInstance {
    RemoteInstance {
        metadata: HashMap::new(),
        ..managed(id, name)
    }
}

/// Attach a fixed address on network `private`.
pub fn with_address(mut instance: RemoteInstance, addr: &str) -> RemoteInstance {
    instance.addresses.insert(
        "private".to_string(),
        vec![InstanceAddress {
            addr: addr.to_string(),
            version: Some(4),
            kind: Some("fixed".to_string()),
        }],
    );
    instance
}

// ── Exit status ──────────────────────────────────────────────────────────────

/// Build an `ExitStatus` from a logical exit code.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── FakeCloud ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CloudState {
    instances: Vec<RemoteInstance>,
    keypairs: HashMap<String, String>,
    requests: Vec<InstanceRequest>,
    calls: Vec<String>,
    next_id: u32,
    /// Statuses handed out by successive `get_instance` calls on created
    /// instances. The last one sticks.
    status_script: VecDeque<InstanceStatus>,
}

/// Failure switches. Each names the operation that returns an error.
#[derive(Default)]
pub struct Failures {
    pub list: bool,
    pub get: bool,
    pub create_keypair: bool,
    pub delete_keypair: bool,
    pub create_instance: bool,
    pub missing_image: bool,
    pub missing_flavor: bool,
    pub missing_network: bool,
    /// Instance IDs whose deletion fails.
    pub delete_instance: HashSet<String>,
}

/// In-memory provider.
#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<CloudState>,
    pub fail: Failures,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instances(instances: Vec<RemoteInstance>) -> Self {
        let cloud = Self::new();
        cloud.state.lock().expect("lock").instances = instances;
        cloud
    }

    pub fn failing(mut self, f: impl FnOnce(&mut Failures)) -> Self {
        f(&mut self.fail);
        self
    }

    /// Statuses reported by successive `get_instance` calls.
    pub fn script_statuses(&self, statuses: impl IntoIterator<Item = InstanceStatus>) {
        self.state.lock().expect("lock").status_script = statuses.into_iter().collect();
    }

    pub fn add_keypair(&self, name: &str) {
        self.state
            .lock()
            .expect("lock")
            .keypairs
            .insert(name.to_string(), "ssh-rsa AAAA".to_string());
    }

    pub fn instances(&self) -> Vec<RemoteInstance> {
        self.state.lock().expect("lock").instances.clone()
    }

    pub fn keypair_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.state.lock().expect("lock").keypairs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn requests(&self) -> Vec<InstanceRequest> {
        self.state.lock().expect("lock").requests.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().expect("lock").calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.state.lock().expect("lock").calls.push(call.into());
    }
}

impl ComputeProvider for FakeCloud {
    async fn resolve_image(&self, name: &str) -> Result<String> {
        self.record(format!("resolve_image {name}"));
        if self.fail.missing_image {
            return Err(ProviderError::ResourceNotFound {
                kind: ResourceKind::Image,
                name: name.to_string(),
            }
            .into());
        }
        Ok(format!("image-{name}"))
    }

    async fn resolve_flavor(&self, name: &str) -> Result<String> {
        self.record(format!("resolve_flavor {name}"));
        if self.fail.missing_flavor {
            return Err(ProviderError::ResourceNotFound {
                kind: ResourceKind::Flavor,
                name: name.to_string(),
            }
            .into());
        }
        Ok(format!("flavor-{name}"))
    }

    async fn resolve_network(&self, name: &str) -> Result<String> {
        self.record(format!("resolve_network {name}"));
        if self.fail.missing_network {
            return Err(ProviderError::ResourceNotFound {
                kind: ResourceKind::Network,
                name: name.to_string(),
            }
            .into());
        }
        Ok(format!("net-{name}"))
    }

    async fn create_instance(&self, request: &InstanceRequest) -> Result<RemoteInstance> {
        self.record(format!("create_instance {}", request.name));
        if self.fail.create_instance {
            anyhow::bail!("quota exceeded");
        }
        let mut state = self.state.lock().expect("lock");
        state.next_id += 1;
        let instance = RemoteInstance {
            id: format!("id-{}", state.next_id),
            name: request.name.clone(),
            status: InstanceStatus::Build,
            metadata: request.metadata.clone(),
            addresses: BTreeMap::new(),
            created: None,
        };
        state.requests.push(request.clone());
        state.instances.push(instance.clone());
        Ok(instance)
    }

    async fn list_instances(&self) -> Result<Vec<RemoteInstance>> {
        self.record("list_instances");
        if self.fail.list {
            anyhow::bail!("service unavailable");
        }
        Ok(self.instances())
    }

    async fn get_instance(&self, id: &str) -> Result<Option<RemoteInstance>> {
        self.record(format!("get_instance {id}"));
        if self.fail.get {
            anyhow::bail!("service unavailable");
        }
        let mut state = self.state.lock().expect("lock");
        let scripted = if state.status_script.len() > 1 {
            state.status_script.pop_front()
        } else {
            state.status_script.front().cloned()
        };
        let Some(instance) = state.instances.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if let Some(status) = scripted {
            instance.status = status;
        }
        Ok(Some(instance.clone()))
    }

    async fn delete_instance(&self, id: &str) -> Result<()> {
        self.record(format!("delete_instance {id}"));
        if self.fail.delete_instance.contains(id) {
            anyhow::bail!("conflict: instance {id} is locked");
        }
        let mut state = self.state.lock().expect("lock");
        let before = state.instances.len();
        state.instances.retain(|i| i.id != id);
        anyhow::ensure!(state.instances.len() < before, "instance {id} not found");
        Ok(())
    }

    async fn create_keypair(&self, name: &str, public_key: &str) -> Result<()> {
        self.record(format!("create_keypair {name}"));
        if self.fail.create_keypair {
            anyhow::bail!("keypair quota exceeded");
        }
        self.state
            .lock()
            .expect("lock")
            .keypairs
            .insert(name.to_string(), public_key.to_string());
        Ok(())
    }

    async fn delete_keypair(&self, name: &str) -> Result<()> {
        self.record(format!("delete_keypair {name}"));
        if self.fail.delete_keypair {
            anyhow::bail!("keypair service unavailable");
        }
        let removed = self.state.lock().expect("lock").keypairs.remove(name);
        anyhow::ensure!(removed.is_some(), "keypair {name} not found");
        Ok(())
    }
}

// ── In-memory key store ──────────────────────────────────────────────────────

/// Tracks which identities have key files without touching disk.
#[derive(Default)]
pub struct MemKeyStore {
    present: Mutex<HashSet<String>>,
    pub fail_generate: bool,
    pub fail_delete: bool,
}

impl MemKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `generate` always fails.
    pub fn failing_generate() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    /// Pretend a key for `short_name` already exists.
    pub fn with_key(self, short_name: &str) -> Self {
        self.present
            .lock()
            .expect("lock")
            .insert(short_name.to_string());
        self
    }

    pub fn has(&self, short_name: &str) -> bool {
        self.present.lock().expect("lock").contains(short_name)
    }

    pub fn count(&self) -> usize {
        self.present.lock().expect("lock").len()
    }
}

impl KeyStore for MemKeyStore {
    fn generate(&self, identity: &InstanceIdentity) -> Result<KeyPair> {
        if self.fail_generate {
            anyhow::bail!("permission denied");
        }
        let private_key_path = self.path(identity);
        let inserted = self
            .present
            .lock()
            .expect("lock")
            .insert(identity.short_name.clone());
        if !inserted {
            return Err(KeyError::AlreadyExists(private_key_path).into());
        }
        Ok(KeyPair {
            public_key_path: private_key_path.with_extension("pub"),
            private_key_path,
            public_key: format!("ssh-rsa AAAAB3Nza{} \n", identity.short_name),
        })
    }

    fn delete(&self, identity: &InstanceIdentity) -> Result<()> {
        if self.fail_delete {
            anyhow::bail!("permission denied");
        }
        self.present
            .lock()
            .expect("lock")
            .remove(&identity.short_name);
        Ok(())
    }

    fn path(&self, identity: &InstanceIdentity) -> PathBuf {
        PathBuf::from("/keys").join(naming::full_name(&identity.short_name))
    }

    fn exists(&self, identity: &InstanceIdentity) -> bool {
        self.has(&identity.short_name)
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Step(String),
    Success(String),
    Warn(String),
}

/// Records every progress event in order.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Warn(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn has_step_containing(&self, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, Event::Step(m) if m.contains(needle)))
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events
            .lock()
            .expect("lock")
            .push(Event::Step(message.to_string()));
    }
    fn success(&self, message: &str) {
        self.events
            .lock()
            .expect("lock")
            .push(Event::Success(message.to_string()));
    }
    fn warn(&self, message: &str) {
        self.events
            .lock()
            .expect("lock")
            .push(Event::Warn(message.to_string()));
    }
}

// ── Selector ─────────────────────────────────────────────────────────────────

/// Returns a fixed answer and records the rows it was shown.
pub struct ScriptedSelector {
    answer: Option<usize>,
    shown: Mutex<Vec<String>>,
}

impl ScriptedSelector {
    pub fn picks(index: usize) -> Self {
        Self {
            answer: Some(index),
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn cancels() -> Self {
        Self {
            answer: None,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().expect("lock").clone()
    }
}

impl InstanceSelector for ScriptedSelector {
    fn select(&self, _prompt: &str, items: &[String]) -> Result<Option<usize>> {
        *self.shown.lock().expect("lock") = items.to_vec();
        Ok(self.answer)
    }
}

// ── Command runner ───────────────────────────────────────────────────────────

/// Returns a fixed exit code and records the invocations.
pub struct FakeRunner {
    code: i32,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeRunner {
    pub fn exiting(code: i32) -> Self {
        Self {
            code,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().expect("lock").clone()
    }
}

impl CommandRunner for FakeRunner {
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        self.calls.lock().expect("lock").push((
            program.to_string(),
            args.iter().map(ToString::to_string).collect(),
        ));
        Ok(exit_status(self.code))
    }
}
