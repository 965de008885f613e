//! # Dungeon Registry
//!
//! The explicitly constructed owner of every pack and template.
//!
//! Registration runs once at startup. It reads the bundled packs first, then
//! the custom dungeon directory: stray templates directly inside it are
//! checked against the Ruins pack, and every sub-directory is loaded as a pack
//! of its own. Bad entries and bad packs are logged and skipped; registration
//! itself only fails when it is run twice.

use super::{
    parse_template_name, ConfigLoader, DungeonPack, DungeonTemplate, DungeonType, NameError,
    PackId, PackRegistry, ResourceEnumerator,
};
use crate::config::{
    DEFAULT_DOWN_SCHEMATIC_PATH, DEFAULT_DUNGEON_WEIGHT, DEFAULT_ERROR_SCHEMATIC_PATH,
    DEFAULT_UP_SCHEMATIC_PATH, RUINS_PACK_NAME, STANDARD_CONFIG_FILE_NAME,
};
use crate::world::{DimensionId, LinkGraph};
use crate::{utils, LifecycleError, PocketDimError, PocketDimResult};
use log::{error, info, log, warn, Level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A pack shipped with the engine: a list of its templates plus its pack directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundledPack {
    /// Pack name; uppercased on registration
    pub name: String,
    /// List of template paths, relative to the bundled root
    pub list_path: PathBuf,
    /// Directory holding the pack's config, relative to the bundled root
    pub pack_path: PathBuf,
}

impl BundledPack {
    pub fn new(
        name: impl Into<String>,
        list_path: impl Into<PathBuf>,
        pack_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            list_path: list_path.into(),
            pack_path: pack_path.into(),
        }
    }

    /// The bundled Ruins pack.
    pub fn ruins() -> Self {
        Self::new("Ruins", "ruins.txt", "ruins")
    }
}

/// Where registration finds its templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Root directory of the bundled schematics
    pub bundled_root: PathBuf,
    /// Bundled packs, registered in order
    pub bundled_packs: Vec<BundledPack>,
    /// Directory of user-supplied dungeons, if any
    pub custom_directory: Option<PathBuf>,
    /// Log every custom template at info level instead of debug
    pub verbose: bool,
}

impl RegistrationConfig {
    /// Creates a configuration with the bundled Ruins pack under `bundled_root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pocketdim::RegistrationConfig;
    ///
    /// let config = RegistrationConfig::new("schematics");
    /// assert_eq!(config.bundled_packs.len(), 1);
    /// assert!(config.custom_directory.is_none());
    /// ```
    pub fn new(bundled_root: impl Into<PathBuf>) -> Self {
        Self {
            bundled_root: bundled_root.into(),
            bundled_packs: vec![BundledPack::ruins()],
            custom_directory: None,
            verbose: false,
        }
    }

    /// Creates a verbose configuration with both a bundled root and a custom directory.
    pub fn for_testing(bundled_root: impl Into<PathBuf>, custom_directory: impl Into<PathBuf>) -> Self {
        Self {
            custom_directory: Some(custom_directory.into()),
            verbose: true,
            ..Self::new(bundled_root)
        }
    }

    pub fn with_custom_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.custom_directory = Some(directory.into());
        self
    }

    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> PocketDimResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self::new("schematics")
    }
}

/// Counts of what registration did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    /// Packs created from a config
    pub packs_loaded: usize,
    /// Packs whose list or config could not be read
    pub packs_skipped: usize,
    /// Templates added to a pack
    pub templates_registered: usize,
    /// Templates kept only as untagged
    pub templates_untagged: usize,
    /// Entries that could not be registered at all
    pub failed_entries: usize,
}

enum Registration {
    Tagged,
    Untagged(NameError),
}

/// Owner of every pack and template, plus the fixed fallback templates.
#[derive(Debug, Clone)]
pub struct DungeonRegistry {
    packs: PackRegistry,
    registered: Vec<Arc<DungeonTemplate>>,
    untagged: Vec<Arc<DungeonTemplate>>,
    default_up: Arc<DungeonTemplate>,
    default_down: Arc<DungeonTemplate>,
    default_error: Arc<DungeonTemplate>,
    initialized: bool,
}

impl DungeonRegistry {
    /// Creates a registry holding only the fallback templates.
    pub fn new() -> Self {
        let fallback = |path: &str| {
            Arc::new(DungeonTemplate::new(
                DEFAULT_DUNGEON_WEIGHT,
                path,
                true,
                DungeonType::unknown(),
            ))
        };

        Self {
            packs: PackRegistry::new(),
            registered: Vec::new(),
            untagged: Vec::new(),
            default_up: fallback(DEFAULT_UP_SCHEMATIC_PATH),
            default_down: fallback(DEFAULT_DOWN_SCHEMATIC_PATH),
            default_error: fallback(DEFAULT_ERROR_SCHEMATIC_PATH),
            initialized: false,
        }
    }

    /// Registers the bundled packs and then the custom directory.
    ///
    /// May only run once per registry.
    pub fn register_all_templates<S>(
        &mut self,
        config: &RegistrationConfig,
        resources: &S,
    ) -> PocketDimResult<RegistrationReport>
    where
        S: ResourceEnumerator + ConfigLoader + ?Sized,
    {
        if self.initialized {
            return Err(LifecycleError::AlreadyRegistered.into());
        }

        let mut report = RegistrationReport::default();
        for bundle in &config.bundled_packs {
            self.register_bundled_pack(&config.bundled_root, bundle, resources, &mut report);
        }
        if let Some(directory) = &config.custom_directory {
            self.register_custom_dungeons(directory, config.verbose, resources, &mut report);
        }
        self.initialized = true;

        info!(
            "Registered {} dungeons in {} packs ({} untagged, {} packs skipped, {} failed)",
            report.templates_registered,
            self.packs.len(),
            report.templates_untagged,
            report.packs_skipped,
            report.failed_entries
        );
        Ok(report)
    }

    fn register_bundled_pack<S>(
        &mut self,
        root: &Path,
        bundle: &BundledPack,
        resources: &S,
        report: &mut RegistrationReport,
    ) where
        S: ResourceEnumerator + ConfigLoader + ?Sized,
    {
        let list_path = root.join(&bundle.list_path);
        let lines = match resources.read_bundle_list(&list_path) {
            Ok(lines) => lines,
            Err(e) => {
                error!("Could not read dungeon list {}: {}", list_path.display(), e);
                report.packs_skipped += 1;
                return;
            }
        };

        let templates: Vec<String> = lines
            .iter()
            .map(|line| root.join(line).to_string_lossy().into_owned())
            .collect();
        self.register_dungeon_pack(
            &bundle.name,
            &root.join(&bundle.pack_path),
            &templates,
            false,
            resources,
            report,
        );
    }

    fn register_custom_dungeons<S>(
        &mut self,
        directory: &Path,
        verbose: bool,
        resources: &S,
        report: &mut RegistrationReport,
    ) where
        S: ResourceEnumerator + ConfigLoader + ?Sized,
    {
        let strays = match resources.list_templates(directory) {
            Ok(strays) => strays,
            Err(e) => {
                error!("Could not read custom dungeons in {}: {}", directory.display(), e);
                return;
            }
        };

        let ruins = self.ruins_pack();
        if ruins.is_none() && !strays.is_empty() {
            warn!(
                "No {} pack is loaded; stray dungeons in {} will be untagged",
                RUINS_PACK_NAME,
                directory.display()
            );
        }
        for path in &strays {
            self.register_template(path, ruins, verbose, report);
        }

        let pack_directories = match resources.list_pack_directories(directory) {
            Ok(directories) => directories,
            Err(e) => {
                error!("Could not read dungeon packs in {}: {}", directory.display(), e);
                return;
            }
        };

        for pack_directory in pack_directories {
            let Some(name) = pack_directory.file_name().map(|name| name.to_string_lossy().into_owned()) else {
                error!("Dungeon pack directory {} has no name", pack_directory.display());
                report.packs_skipped += 1;
                continue;
            };
            match resources.list_templates(&pack_directory) {
                Ok(templates) => {
                    self.register_dungeon_pack(&name, &pack_directory, &templates, verbose, resources, report);
                }
                Err(e) => {
                    error!("Could not read dungeon pack {}: {}", pack_directory.display(), e);
                    report.packs_skipped += 1;
                }
            }
        }
    }

    /// Registers a batch of templates into the pack called `name`.
    ///
    /// A new pack's config is read from `directory` first, and the whole batch
    /// is skipped if that fails. A pack that already exists keeps its config
    /// and receives the batch as is.
    pub fn register_dungeon_pack<L>(
        &mut self,
        name: &str,
        directory: &Path,
        templates: &[String],
        verbose: bool,
        loader: &L,
        report: &mut RegistrationReport,
    ) -> Option<PackId>
    where
        L: ConfigLoader + ?Sized,
    {
        let id = match self.packs.lookup(name) {
            Some(existing) => {
                warn!(
                    "A dungeon pack named {} has already been loaded; adding the dungeons in {} to it",
                    name.to_uppercase(),
                    directory.display()
                );
                existing
            }
            None => {
                let config_path = directory.join(STANDARD_CONFIG_FILE_NAME);
                match loader.load_config(&config_path) {
                    Ok(config) => {
                        report.packs_loaded += 1;
                        self.packs.register_pack(name, config)
                    }
                    Err(e) => {
                        error!("Could not load dungeon pack {}: {}", name.to_uppercase(), e);
                        report.packs_skipped += 1;
                        return None;
                    }
                }
            }
        };

        for path in templates {
            self.register_template(path, Some(id), verbose, report);
        }
        Some(id)
    }

    fn register_template(
        &mut self,
        path: &str,
        pack: Option<PackId>,
        verbose: bool,
        report: &mut RegistrationReport,
    ) {
        let level = if verbose { Level::Info } else { Level::Debug };
        match self.try_register_template(path, pack) {
            Ok(Registration::Tagged) => {
                report.templates_registered += 1;
                log!(level, "Registered dungeon: {}", path);
            }
            Ok(Registration::Untagged(reason)) => {
                report.templates_untagged += 1;
                log!(level, "Registered untagged dungeon {}: {}", path, reason);
            }
            Err(e) => {
                report.failed_entries += 1;
                error!("Failed to register dungeon {}: {}", path, e);
            }
        }
    }

    fn try_register_template(&mut self, path: &str, pack: Option<PackId>) -> PocketDimResult<Registration> {
        let file_name =
            utils::file_name(path).ok_or_else(|| PocketDimError::InvalidTemplatePath(path.to_string()))?;

        let parsed = match pack {
            Some(id) => {
                let owner = self
                    .packs
                    .get(id)
                    .ok_or_else(|| PocketDimError::UnknownPack(id.to_string()))?;
                parse_template_name(file_name, owner).map(|name| (id, name))
            }
            None => Err(NameError::NoPack),
        };

        match parsed {
            Ok((id, name)) => {
                let owner = self
                    .packs
                    .get_mut(id)
                    .ok_or_else(|| PocketDimError::UnknownPack(id.to_string()))?;
                let dungeon_type = owner
                    .get_type(&name.type_name)
                    .cloned()
                    .ok_or_else(|| PocketDimError::ForeignTemplate {
                        path: path.to_string(),
                        pack: owner.name().to_string(),
                    })?;
                let template = Arc::new(DungeonTemplate::new(name.weight, path, name.is_open, dungeon_type));
                owner.add_template(Arc::clone(&template))?;
                self.registered.push(template);
                Ok(Registration::Tagged)
            }
            Err(reason) => {
                self.untagged.push(Arc::new(DungeonTemplate::new(
                    DEFAULT_DUNGEON_WEIGHT,
                    path,
                    true,
                    DungeonType::unknown(),
                )));
                Ok(Registration::Untagged(reason))
            }
        }
    }

    /// Lists the names of every registered and untagged template.
    ///
    /// Names are de-duplicated and sorted alphabetically, ignoring case.
    pub fn list_known_template_names(&self) -> PocketDimResult<Vec<String>> {
        self.ensure_registered()?;

        let unique: BTreeSet<&str> = self
            .registered
            .iter()
            .chain(self.untagged.iter())
            .map(|template| template.name())
            .collect();
        let mut names: Vec<String> = unique.into_iter().map(str::to_string).collect();
        names.sort_by_key(|name| name.to_lowercase());
        Ok(names)
    }

    /// Gets the pack a dimension belongs to.
    ///
    /// That is the owner of its template, or the Ruins pack when it has no
    /// template or an untagged one.
    pub fn pack_for_dimension<G>(&self, graph: &G, id: DimensionId) -> Option<PackId>
    where
        G: LinkGraph + ?Sized,
    {
        graph
            .dimension(id)
            .and_then(|node| node.template.as_ref())
            .and_then(|template| template.owner())
            .or_else(|| self.ruins_pack())
    }

    /// Fails unless templates have been registered.
    pub fn ensure_registered(&self) -> PocketDimResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(LifecycleError::NotRegistered.into())
        }
    }

    pub fn is_registered(&self) -> bool {
        self.initialized
    }

    pub fn ruins_pack(&self) -> Option<PackId> {
        self.packs.lookup(RUINS_PACK_NAME)
    }

    /// Gets every template added to a pack, in registration order.
    pub fn registered_templates(&self) -> &[Arc<DungeonTemplate>] {
        &self.registered
    }

    /// Gets every template whose name failed validation, in registration order.
    pub fn untagged_templates(&self) -> &[Arc<DungeonTemplate>] {
        &self.untagged
    }

    pub fn default_up(&self) -> &Arc<DungeonTemplate> {
        &self.default_up
    }

    pub fn default_down(&self) -> &Arc<DungeonTemplate> {
        &self.default_down
    }

    pub fn default_error(&self) -> &Arc<DungeonTemplate> {
        &self.default_error
    }

    pub fn pack(&self, id: PackId) -> Option<&DungeonPack> {
        self.packs.get(id)
    }

    pub fn packs(&self) -> &PackRegistry {
        &self.packs
    }

    pub fn lookup_pack(&self, name: &str) -> Option<PackId> {
        self.packs.lookup(name)
    }
}

impl Default for DungeonRegistry {
    fn default() -> Self {
        Self::new()
    }
}
