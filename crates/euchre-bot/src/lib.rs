pub mod bot;
pub mod policy;
pub mod table;

pub use bot::{
    BidPlanner, BotParams, DiscardError, DiscardPlanner, PlayError, PlayInput, PlayPlanner,
    Strategy, StrategySet, UnseenTracker,
};
pub use policy::{
    BidContext, DiscardContext, ForcedBidPolicy, HeuristicPolicy, PlayContext, Policy,
    PolicyError,
};
pub use table::{BidOutcome, Table, TableError, TrickResult};
