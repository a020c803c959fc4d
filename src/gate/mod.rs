//! Per-event veto applied before any rendering.

use std::collections::HashSet;

use crate::event::{LoadContext, RawValue};

/// Host-supplied predicate deciding whether a change event is rendered.
///
/// Every method defaults to allowing the event. Implementations must not
/// block and must be safe for concurrent read-only use.
pub trait EventGate: Send + Sync {
    fn allow_insert(&self, _ctx: &LoadContext, _values: &[RawValue]) -> bool {
        true
    }

    fn allow_update(&self, _ctx: &LoadContext, _values: &[RawValue], _keys: &[RawValue]) -> bool {
        true
    }

    fn allow_delete(&self, _ctx: &LoadContext, _keys: &[RawValue]) -> bool {
        true
    }
}

/// Allows only events of the listed tables
#[derive(Debug, Clone, Default)]
pub struct TableGate {
    tables: HashSet<String>,
}

impl TableGate {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }

    fn allows(&self, ctx: &LoadContext) -> bool {
        self.tables.contains(&ctx.table)
    }
}

impl EventGate for TableGate {
    fn allow_insert(&self, ctx: &LoadContext, _values: &[RawValue]) -> bool {
        self.allows(ctx)
    }

    fn allow_update(&self, ctx: &LoadContext, _values: &[RawValue], _keys: &[RawValue]) -> bool {
        self.allows(ctx)
    }

    fn allow_delete(&self, ctx: &LoadContext, _keys: &[RawValue]) -> bool {
        self.allows(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDeletes;

    impl EventGate for NoDeletes {
        fn allow_delete(&self, _ctx: &LoadContext, _keys: &[RawValue]) -> bool {
            false
        }
    }

    #[test]
    fn test_default_methods_allow() {
        let ctx = LoadContext::new("t");
        assert!(NoDeletes.allow_insert(&ctx, &[]));
        assert!(NoDeletes.allow_update(&ctx, &[], &[]));
        assert!(!NoDeletes.allow_delete(&ctx, &[]));
    }

    #[test]
    fn test_table_gate() {
        let gate = TableGate::new(["orders"]);
        assert!(gate.allow_insert(&LoadContext::new("orders"), &[]));
        assert!(!gate.allow_insert(&LoadContext::new("customers"), &[]));
        assert!(!gate.allow_delete(&LoadContext::new("customers"), &[]));
    }
}
