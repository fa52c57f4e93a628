use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::descr::{name_hash, CallDescr, Selector};
use crate::error::{DispatchError, Result};
use crate::handler::{CallContext, CallHandler};

/// The command table.
///
/// Commands are registered once at startup and dispatched read-only after
/// that. Enumeration order is lexicographic by name, so index-based
/// iteration is deterministic across runs.
#[derive(Default)]
pub struct CmdRegistry {
    table: BTreeMap<String, Arc<dyn CallHandler>>,
    hashes: HashMap<i32, String>,
}

impl CmdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any previous entry.
    /// A name-hash collision is logged; the later registration owns the
    /// hash.
    pub fn add(&mut self, name: impl Into<String>, handler: Arc<dyn CallHandler>) {
        let name = name.into();
        let hash = name_hash(&name);
        if let Some(previous) = self.hashes.get(&hash) {
            if previous != &name {
                tracing::warn!(%name, %previous, "name hash collision");
            }
        }
        self.hashes.insert(hash, name.clone());
        self.table.insert(name, handler);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The command name at `index` in enumeration order.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.table.keys().nth(index).map(String::as_str)
    }

    fn resolve(&self, selector: &Selector) -> Option<(&str, &Arc<dyn CallHandler>)> {
        match selector {
            Selector::Name(name) => self.table.get_key_value(name.as_str()),
            Selector::Hash(hash) => {
                let name = self.hashes.get(hash)?;
                self.table.get_key_value(name.as_str())
            }
            Selector::Index(index) => self.table.iter().nth(*index),
        }
        .map(|(name, handler)| (name.as_str(), handler))
    }

    /// Resolves the descriptor's selector and runs the handler.
    pub fn call(&self, descr: CallDescr<'_>) -> Result<()> {
        let Some((name, handler)) = self.resolve(&descr.selector) else {
            tracing::debug!(selector = ?descr.selector, "command not found");
            return Err(DispatchError::NotFound);
        };
        tracing::trace!(name, call_type = ?descr.call_type, "dispatching");
        handler.call(CallContext {
            registry: self,
            call_type: descr.call_type,
            input: descr.input,
            output: descr.output,
        })
    }
}

#[cfg(test)]
mod tests {
    use daqlink_frame::Fifo;
    use daqlink_stream::TextStream;

    use crate::descr::CallType;
    use crate::handler::Setting;

    use super::*;

    fn sample_registry() -> CmdRegistry {
        let mut registry = CmdRegistry::new();
        registry.add("Gain", Arc::new(Setting::read_only(|| 3i32)));
        registry.add("ADC1", Arc::new(Setting::read_only(|| 1.5f32)));
        registry.add("Bridge", Arc::new(Setting::read_only(|| true)));
        registry
    }

    fn get(registry: &CmdRegistry, selector: Selector) -> Result<String> {
        let mut input = Fifo::new();
        let mut output = Fifo::new();
        {
            let mut in_stream = TextStream::new(&mut input);
            let mut out_stream = TextStream::new(&mut output);
            registry.call(CallDescr {
                selector,
                call_type: CallType::Get,
                input: &mut in_stream,
                output: &mut out_stream,
            })?;
        }
        Ok(String::from_utf8_lossy(output.as_slice()).into_owned())
    }

    #[test]
    fn resolves_by_name() {
        let registry = sample_registry();
        assert_eq!(get(&registry, Selector::Name("ADC1".into())).unwrap(), "1.5");
    }

    #[test]
    fn resolves_by_hash() {
        let registry = sample_registry();
        let hash = name_hash("Gain");
        assert_eq!(get(&registry, Selector::Hash(hash)).unwrap(), "3");
    }

    #[test]
    fn enumeration_is_lexicographic() {
        let registry = sample_registry();
        assert_eq!(registry.name_at(0), Some("ADC1"));
        assert_eq!(registry.name_at(1), Some("Bridge"));
        assert_eq!(registry.name_at(2), Some("Gain"));
        assert_eq!(registry.name_at(3), None);

        assert_eq!(get(&registry, Selector::Index(0)).unwrap(), "1.5");
        assert!(matches!(
            get(&registry, Selector::Index(3)),
            Err(DispatchError::NotFound)
        ));
    }

    #[test]
    fn unknown_name_and_hash_are_not_found() {
        let registry = sample_registry();
        assert!(matches!(
            get(&registry, Selector::Name("Missing".into())),
            Err(DispatchError::NotFound)
        ));
        assert!(matches!(
            get(&registry, Selector::Hash(name_hash("Missing"))),
            Err(DispatchError::NotFound)
        ));
    }

    #[test]
    fn re_registration_replaces() {
        let mut registry = sample_registry();
        registry.add("Gain", Arc::new(Setting::read_only(|| 7i32)));
        assert_eq!(registry.len(), 3);
        assert_eq!(get(&registry, Selector::Name("Gain".into())).unwrap(), "7");
    }
}
