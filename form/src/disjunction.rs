//! Tabbed rendering of disjunctions.
//!
//! Every branch is compiled up front; only the active tab is visible.

use geem_spec::Entity;

use crate::cardinality::Cardinality;
use crate::compiler::FieldCompiler;
use crate::context::RenderContext;
use crate::render::{Fragment, Tab, Widget};

/// Compiles disjunction nodes into tab sets.
#[derive(Debug, Clone, Copy)]
pub struct DisjunctionCompiler<'s> {
    fields: FieldCompiler<'s>,
}

impl<'s> DisjunctionCompiler<'s> {
    /// Creates a disjunction compiler delegating branches to `fields`.
    #[must_use]
    pub fn new(fields: FieldCompiler<'s>) -> Self {
        Self { fields }
    }

    /// Compiles `entity`'s branches into one tab-set fragment.
    ///
    /// A disjunction without branches yields a diagnostic fragment.
    pub fn compile(&self, ctx: &mut RenderContext, entity: &Entity) -> Fragment {
        if entity.components.is_empty() {
            tracing::warn!(entity = %entity.id, "disjunction has no branches");
            return self.fields.diagnostic(
                ctx,
                entity,
                format!("disjunction {} has no branches", entity.id),
            );
        }

        let mut fragment = self.fields.fragment(ctx, entity, false, |_| Widget::Tabs {
            tabs: Vec::new(),
        });
        // tab sets carry no label and no repeat control of their own
        fragment.label = None;
        fragment.repeat = None;
        fragment.instances.clear();

        let mut tabs = Vec::with_capacity(entity.components.len());
        for (key, branch) in entity.components.iter() {
            let id = ctx.next_panel_id(&fragment.id, key);
            let cardinality = Cardinality::from_bounds(
                branch.min_cardinality,
                branch.max_cardinality,
                false,
            );
            ctx.enter_tab();
            let fragments = self.fields.compile(ctx, branch);
            ctx.leave_tab();
            tabs.push(Tab {
                id,
                entity_id: branch.id.clone(),
                label: self.fields.label(branch, &cardinality),
                active: tabs.is_empty(),
                fragments,
            });
        }
        tracing::debug!(entity = %entity.id, branches = tabs.len(), "compiled disjunction");
        fragment.widget = Widget::Tabs { tabs };
        fragment
    }
}
