//! Per-render-pass state.

use serde::{Deserialize, Serialize};

/// Hands out presentation ids for one render pass.
///
/// The counter only ever grows, so ids stay unique across repeated
/// instances added after the initial compile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    counter: u64,
    #[serde(skip)]
    tab_depth: usize,
}

impl RenderContext {
    /// Starts a fresh pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next counter value.
    pub fn next_counter(&mut self) -> u64 {
        let n = self.counter;
        self.counter += 1;
        n
    }

    /// A presentation id for one rendered instance of `entity_id`.
    pub fn next_id(&mut self, entity_id: &str) -> String {
        let n = self.next_counter();
        sanitize_id(&format!("{entity_id}_{n}"))
    }

    /// Id of a disjunction branch panel.
    pub fn next_panel_id(&mut self, parent_id: &str, branch_id: &str) -> String {
        let n = self.next_counter();
        format!("panel_{}", sanitize_id(&format!("{parent_id}_{branch_id}_{n}")))
    }

    /// Returns true while compiling inside a tab panel.
    #[must_use]
    pub fn in_tab(&self) -> bool {
        self.tab_depth > 0
    }

    pub(crate) fn enter_tab(&mut self) {
        self.tab_depth += 1;
    }

    pub(crate) fn leave_tab(&mut self) {
        self.tab_depth = self.tab_depth.saturating_sub(1);
    }
}

/// Replaces everything outside `[A-Za-z0-9_]` with `_`.
#[must_use]
pub fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_sanitized() {
        let mut ctx = RenderContext::new();
        assert_eq!(ctx.next_id("GENEPIO:0001"), "GENEPIO_0001_0");
        assert_eq!(ctx.next_id("GENEPIO:0001"), "GENEPIO_0001_1");
        assert_eq!(ctx.next_panel_id("d_2", "OBI:1"), "panel_d_2_OBI_1_2");
    }

    #[test]
    fn tab_nesting() {
        let mut ctx = RenderContext::new();
        ctx.enter_tab();
        ctx.enter_tab();
        ctx.leave_tab();
        assert!(ctx.in_tab());
        ctx.leave_tab();
        assert!(!ctx.in_tab());
    }
}
