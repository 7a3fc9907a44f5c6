//! Package orchestration
//!
//! A [`Package`] owns the directors of all its modules together with the
//! shared interface registry and the class index used to find the module
//! that defines a base class. Modules can be generated concurrently; each
//! director serializes its own extraction and preprocessing.

use crate::analyzer::{check_interface_methods, preprocess_module, BaseResolver, InterfaceRegistry};
use crate::build::output::write_if_changed;
use crate::codegen::interface::GENERATED_NOTICE;
use crate::codegen::{ConstantsGenerator, DepsGenerator, DocGenerator, InterfaceGenerator};
use crate::config::Config;
use crate::diagnostics::{WeldError, WeldResult};
use crate::director::{Director, Extraction, Spec};
use crate::extractor::{DeclSource, JsonDirSource, ValidatingSource};
use crate::typemap::TypemapRegistry;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

/// Builder for [`Package`]
pub struct PackageBuilder {
    name: String,
    config: Config,
    source: Option<Box<dyn DeclSource>>,
    manifest: Option<PathBuf>,
    specs: Vec<Spec>,
    registry: Option<Arc<InterfaceRegistry>>,
}

impl PackageBuilder {
    pub fn new(name: impl Into<String>, config: Config) -> Self {
        Self {
            name: name.into(),
            config,
            source: None,
            manifest: None,
            specs: Vec::new(),
            registry: None,
        }
    }

    /// Declaration source; defaults to the JSON files in `decls_dir`
    pub fn source(mut self, source: impl DeclSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Manifest the package was loaded from, listed as a dependency
    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }

    /// Add a module
    pub fn module(mut self, spec: Spec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Add several modules
    pub fn modules(mut self, specs: impl IntoIterator<Item = Spec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Share an interface registry with other packages
    pub fn registry(mut self, registry: Arc<InterfaceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> WeldResult<Package> {
        self.config.validate()?;
        let mut directors: IndexMap<String, Arc<Director>> = IndexMap::new();
        for spec in self.specs {
            let name = spec.module_name.clone();
            if directors.contains_key(&name) {
                return Err(WeldError::config(format!(
                    "module {} declared twice in package {}",
                    name, self.name
                )));
            }
            directors.insert(name, Arc::new(Director::new(spec)));
        }
        let source = match self.source {
            Some(source) => source,
            None => Box::new(ValidatingSource::new(JsonDirSource::new(&self.config.decls_dir))),
        };
        Ok(Package {
            name: self.name,
            config: self.config,
            source,
            manifest: self.manifest,
            directors,
            registry: self.registry.unwrap_or_default(),
            class_index: Mutex::new(HashMap::new()),
            analyzed: Mutex::new(HashSet::new()),
        })
    }
}

/// Module that failed to generate
#[derive(Debug)]
pub struct ModuleFailure {
    pub module: String,
    pub error: WeldError,
}

/// Outcome of [`Package::generate_all`]
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Modules generated successfully, in package order
    pub generated: Vec<String>,
    pub failures: Vec<ModuleFailure>,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A set of modules generated together
pub struct Package {
    name: String,
    config: Config,
    source: Box<dyn DeclSource>,
    manifest: Option<PathBuf>,
    directors: IndexMap<String, Arc<Director>>,
    registry: Arc<InterfaceRegistry>,
    /// Class name to defining module
    class_index: Mutex<HashMap<String, String>>,
    /// Modules whose interface check already ran
    analyzed: Mutex<HashSet<String>>,
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.name)
            .field("modules", &self.directors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Package {
    pub fn builder(name: impl Into<String>, config: Config) -> PackageBuilder {
        PackageBuilder::new(name, config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<InterfaceRegistry> {
        &self.registry
    }

    /// Module names in declaration order
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.directors.keys().map(String::as_str)
    }

    pub fn director(&self, module: &str) -> WeldResult<&Arc<Director>> {
        self.directors
            .get(module)
            .ok_or_else(|| WeldError::config(format!("unknown module {} in package {}", module, self.name)))
    }

    /// Module defining `class`, if its director has extracted
    pub fn class_module(&self, class: &str) -> Option<String> {
        self.class_index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(class)
            .cloned()
    }

    /// Extract a module once, indexing its generated classes
    pub fn extract(&self, director: &Director) -> WeldResult<Arc<Extraction>> {
        director.extract_interface(&*self.source, &self.config, |extraction| {
            self.index_classes(director, extraction)
        })
    }

    fn index_classes(&self, director: &Director, extraction: &Extraction) -> WeldResult<()> {
        let view = director.view(extraction);
        let mut index = self.class_index.lock().unwrap_or_else(PoisonError::into_inner);
        for class in view.generated_classes() {
            // fails on an ambiguous hierarchy
            view.base_class(class)?;
            if let Some(previous) = index.insert(class.name().to_string(), director.module_name().to_string()) {
                if previous != director.module_name() {
                    tracing::warn!(
                        class = %class.name(),
                        previous = %previous,
                        module = %director.module_name(),
                        "class defined by more than one module"
                    );
                }
            }
        }
        Ok(())
    }

    /// Director of the module defining `class`
    ///
    /// Directors are extracted in package order until one of them defines
    /// the class.
    pub fn director_for_class(&self, class: &str) -> WeldResult<Arc<Director>> {
        if let Some(module) = self.class_module(class) {
            return Ok(Arc::clone(self.director(&module)?));
        }
        for director in self.directors.values() {
            self.extract(director)?;
            if let Some(module) = self.class_module(class) {
                return Ok(Arc::clone(self.director(&module)?));
            }
        }
        Err(WeldError::MissingDirector(class.to_string()))
    }

    fn preprocess(&self, director: &Director, extraction: &Extraction) -> WeldResult<()> {
        let _guard = director.preprocess_lock();
        preprocess_module(&self.registry, director.view(extraction))
    }

    /// Extract, preprocess and check a module
    ///
    /// The interface check runs once per module; later calls reuse the
    /// registered classes.
    pub fn analyze(&self, module: &str) -> WeldResult<Arc<Extraction>> {
        let director = self.director(module)?;
        let extraction = self.extract(director)?;
        self.preprocess(director, &extraction)?;

        let claimed = self
            .analyzed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(module.to_string());
        if claimed {
            match check_interface_methods(&self.registry, director.view(&extraction), self) {
                Ok(report) => {
                    for diagnostic in report.diagnostics() {
                        tracing::warn!(module = %module, "{}", diagnostic.format());
                    }
                }
                Err(e) => {
                    // a failed check is retried by the next caller
                    self.analyzed
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(module);
                    return Err(e);
                }
            }
        }
        Ok(extraction)
    }

    fn typemaps(&self, spec: &Spec) -> WeldResult<TypemapRegistry> {
        TypemapRegistry::for_module(&spec.typemaps, &spec.map_applies)
    }

    /// Write the dependency file of a module
    pub fn create_rakefile(&self, module: &str) -> WeldResult<bool> {
        let director = self.director(module)?;
        let mut generator = DepsGenerator::new(director.spec(), &self.config);
        if let Some(manifest) = self.manifest.as_deref() {
            generator = generator.manifest(manifest);
        }
        let text = generator.generate()?;
        write_if_changed(&self.config.deps_file(module), &text)
    }

    /// Write the interface file, header and constant script of a module
    pub fn generate_code(&self, module: &str) -> WeldResult<()> {
        let extraction = self.analyze(module)?;
        let director = self.director(module)?;
        let spec = director.spec();
        let typemaps = self.typemaps(spec)?;

        let generator = InterfaceGenerator::new(spec, &extraction, &self.registry, &typemaps, &self.config);
        let header = generator.generate_header()?;
        write_if_changed(&self.config.interface_file(module), &generator.generate_interface())?;
        write_if_changed(&self.config.interface_include_file(module), &header)?;

        if let Some(script) = ConstantsGenerator::new(&spec.package, &extraction.module).generate() {
            write_if_changed(&self.config.ext_file(module), &script)?;
        }
        tracing::info!(module = %module, "generated interface");
        Ok(())
    }

    /// Write the documentation stub of a module
    pub fn generate_doc(&self, module: &str) -> WeldResult<bool> {
        let extraction = self.analyze(module)?;
        let spec = self.director(module)?.spec();
        let typemaps = self.typemaps(spec)?;
        let text = DocGenerator::new(spec, &extraction, &self.registry, &typemaps).generate()?;
        write_if_changed(&self.config.doc_file(module), &text)
    }

    /// Write the shared typemaps included by `common.i`
    pub fn write_common_typemaps(&self) -> WeldResult<bool> {
        let mut typemaps = TypemapRegistry::new();
        typemaps.extend_common()?;
        let text = format!("{}\n{}", GENERATED_NOTICE, typemaps.common_to_swig());
        write_if_changed(&self.common_typemaps_file(), &text)
    }

    pub fn common_typemaps_file(&self) -> PathBuf {
        self.config.swig_dir.join("common_typemaps.i")
    }

    /// Every output of one module
    pub fn generate_module(&self, module: &str) -> WeldResult<()> {
        self.create_rakefile(module)?;
        self.generate_code(module)?;
        self.generate_doc(module)?;
        Ok(())
    }

    /// Generate every module using up to `jobs` worker threads
    ///
    /// A failing module does not stop the others.
    pub fn generate_all(&self, jobs: usize) -> GenerateReport {
        self.generate_modules(&self.module_names().collect::<Vec<_>>(), jobs)
    }

    /// Generate the named modules using up to `jobs` worker threads
    pub fn generate_modules(&self, modules: &[&str], jobs: usize) -> GenerateReport {
        let mut seen = HashSet::new();
        let modules: Vec<&str> = modules.iter().copied().filter(|m| seen.insert(*m)).collect();
        let modules = modules.as_slice();
        let workers = jobs.clamp(1, modules.len().max(1));
        let next = AtomicUsize::new(0);
        let results: Mutex<Vec<(usize, WeldResult<()>)>> = Mutex::new(Vec::new());
        tracing::debug!(package = %self.name, modules = modules.len(), workers, "generating");

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(module) = modules.get(index) else {
                        break;
                    };
                    let result = self.generate_module(module);
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((index, result));
                });
            }
        });

        let mut results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
        results.sort_by_key(|(index, _)| *index);
        let mut report = GenerateReport::default();
        for (index, result) in results {
            let module = modules[index].to_string();
            match result {
                Ok(()) => report.generated.push(module),
                Err(error) => {
                    tracing::error!(module = %module, "{}", error);
                    report.failures.push(ModuleFailure { module, error });
                }
            }
        }
        report
    }

    /// Path of the package manifest, if any
    pub fn manifest(&self) -> Option<&Path> {
        self.manifest.as_deref()
    }
}

impl BaseResolver for Package {
    fn ensure_class_interface(&self, class: &str) -> WeldResult<()> {
        if self.registry.has_class(class) {
            return Ok(());
        }
        let director = self.director_for_class(class)?;
        let extraction = self.extract(&director)?;
        self.preprocess(&director, &extraction)
    }
}
