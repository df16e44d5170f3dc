use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::RegistryError;
use crate::core::operation::{Operation, OperationKind};

/// Immutable, cheaply clonable operation table. Keeps registration order.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

struct Inner {
    ops: Vec<Arc<dyn Operation>>,
    by_name: HashMap<&'static str, usize>,
}

#[derive(Default)]
pub struct RegistryBuilder {
    ops: Vec<Arc<dyn Operation>>,
    by_name: HashMap<&'static str, usize>,
}

impl RegistryBuilder {
    pub fn register<T: Operation + 'static>(self, op: T) -> Result<Self, RegistryError> {
        self.register_arc(Arc::new(op))
    }

    pub fn register_arc(mut self, op: Arc<dyn Operation>) -> Result<Self, RegistryError> {
        let name = op.name();
        if self.by_name.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.by_name.insert(name, self.ops.len());
        self.ops.push(op);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            inner: Arc::new(Inner {
                ops: self.ops,
                by_name: self.by_name,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationMeta {
    pub name: &'static str,
    pub kind: OperationKind,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
    pub mime_type: Option<&'static str>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.inner.by_name.get(name).map(|&i| &self.inner.ops[i])
    }

    pub fn len(&self) -> usize {
        self.inner.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.ops.is_empty()
    }

    /// Names of operations of `kind`, in registration order.
    pub fn names(&self, kind: OperationKind) -> Vec<&'static str> {
        self.inner
            .ops
            .iter()
            .filter(|op| op.kind() == kind)
            .map(|op| op.name())
            .collect()
    }

    pub fn list(&self, kind: OperationKind) -> Vec<OperationMeta> {
        self.inner
            .ops
            .iter()
            .filter(|op| op.kind() == kind)
            .map(|op| OperationMeta {
                name: op.name(),
                kind: op.kind(),
                description: op.description(),
                input_schema: op.input_schema(),
                mime_type: op.mime_type(),
            })
            .collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("operations", &self.inner.ops.iter().map(|op| op.name()).collect::<Vec<_>>())
            .finish()
    }
}
