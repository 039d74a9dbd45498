/// Handle returned by [`ViewportSignals::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct SubscriptionId(pub u64);

/// Registry of visual-viewport listeners (resize and scroll of the visible area).
///
/// Owners are identified by the index of the section that registered them. Ids are never reused.
#[derive(Clone, Debug, Default)]
pub struct ViewportSignals {
    next_id: u64,
    active: Vec<(SubscriptionId, usize)>,
    attached_total: u64,
}

impl ViewportSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, owner: usize) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.attached_total += 1;
        self.active.push((id, owner));
        tracing::debug!(id = id.0, owner, "viewport listener attached");
        id
    }

    /// Detach a listener. Returns `false` if it was already released.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(pos) = self.active.iter().position(|(sid, _)| *sid == id) else {
            return false;
        };
        let (_, owner) = self.active.remove(pos);
        tracing::debug!(id = id.0, owner, "viewport listener detached");
        true
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.active.iter().any(|(sid, _)| *sid == id)
    }

    /// Owners of the live listeners, in attach order.
    pub fn subscribers(&self) -> impl Iterator<Item = usize> + '_ {
        self.active.iter().map(|(_, owner)| *owner)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of attaches over the registry's lifetime.
    pub fn attached_total(&self) -> u64 {
        self.attached_total
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/signals.rs"]
mod tests;
