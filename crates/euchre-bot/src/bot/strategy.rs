/// Plans a seat commits to for the rest of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Keep leading trump until the opponents are out.
    DrawTrump,
    /// Trump is drawn; hold remaining trump back for ruffing.
    PreserveTrump,
}

/// Per-deal strategy tags. Cleared at the start of each deal's play.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategySet {
    tags: Vec<Strategy>,
}

impl StrategySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: Strategy) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn pop(&mut self, tag: Strategy) -> bool {
        match self.tags.iter().position(|t| *t == tag) {
            Some(idx) => {
                self.tags.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, tag: Strategy) -> bool {
        self.tags.contains(&tag)
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[Strategy] {
        &self.tags
    }
}
