//! The process-wide mapping from names to structure function calculators.
//!
//! The registry starts out holding the built-in calculators. Additional
//! calculators become selectable by name (through
//! [`crate::ArgumentContainer::sf_method`]) once they are passed to
//! [`register_calculator`].

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use log::debug;

use crate::calculators::{Basic, Bauer2009a, Bauer2009b, Macleod2012, Schmidt2010};
use crate::{Error, StructureFunctionCalculator};

/// A known calculator, tagged with its concrete type
#[derive(Clone)]
struct Entry {
    type_id: TypeId,
    calculator: Arc<dyn StructureFunctionCalculator>,
}

impl Entry {
    fn new<C: StructureFunctionCalculator + 'static>(calculator: C) -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            calculator: Arc::new(calculator),
        }
    }
}

struct Registry {
    // every calculator we know about, in registration order
    known: Vec<Entry>,
    by_name: HashMap<&'static str, Arc<dyn StructureFunctionCalculator>>,
}

impl Registry {
    fn new() -> Self {
        let mut out = Self {
            known: vec![
                Entry::new(Basic),
                Entry::new(Bauer2009a),
                Entry::new(Bauer2009b),
                Entry::new(Macleod2012),
                Entry::new(Schmidt2010),
            ],
            by_name: HashMap::new(),
        };
        out.rebuild();
        out
    }

    fn rebuild(&mut self) {
        self.by_name = self
            .known
            .iter()
            .map(|entry| (entry.calculator.name(), entry.calculator.clone()))
            .collect();
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().map(|name| name.to_string()).collect();
        names.sort();
        names
    }
}

/// global variable that holds every known calculator.
///
/// This is lazily initialized with the built-in calculators. Reads vastly
/// outnumber writes, hence the [`RwLock`]
static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

// a panic while holding the lock can't leave the registry half-updated (every
// mutation is a push followed by a rebuild), so poisoning is ignored
fn read_registry() -> std::sync::RwLockReadGuard<'static, Registry> {
    REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_registry() -> std::sync::RwLockWriteGuard<'static, Registry> {
    REGISTRY.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Makes `calculator` selectable by its [`StructureFunctionCalculator::name`].
///
/// Registering another instance of an already registered type replaces the
/// earlier instance. Registering a calculator under a name that belongs to
/// a calculator of a different type is an error.
pub fn register_calculator<C: StructureFunctionCalculator + 'static>(
    calculator: C,
) -> Result<(), Error> {
    let entry = Entry::new(calculator);
    let name = entry.calculator.name();

    let mut registry = write_registry();
    if let Some(existing) = registry.known.iter().position(|e| e.type_id == entry.type_id) {
        let previous_name = registry.known[existing].calculator.name();
        if previous_name != name && registry.by_name.contains_key(name) {
            return Err(Error::calculator_conflict(name.to_owned()));
        }
        debug!("replacing the registered \"{previous_name}\" calculator");
        registry.known[existing] = entry;
    } else if registry.by_name.contains_key(name) {
        return Err(Error::calculator_conflict(name.to_owned()));
    } else {
        debug!("registering the \"{name}\" calculator");
        registry.known.push(entry);
    }
    registry.rebuild();
    Ok(())
}

/// Rebuilds the name lookup from every calculator registered so far.
///
/// [`register_calculator`] already does this, so calling it is only
/// necessary to recover a consistent state; it is safe to call any number
/// of times.
pub fn update_registry() {
    write_registry().rebuild();
}

/// The names of every registered calculator, in sorted order
pub fn registered_calculators() -> Vec<String> {
    read_registry().names()
}

/// Looks up the calculator registered under `name`
pub fn calculator_from_name(name: &str) -> Result<Arc<dyn StructureFunctionCalculator>, Error> {
    let registry = read_registry();
    match registry.by_name.get(name) {
        Some(calculator) => Ok(calculator.clone()),
        None => Err(Error::calculator_name(name.to_owned(), registry.names())),
    }
}
