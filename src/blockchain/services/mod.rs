// src/blockchain/services/mod.rs

pub mod jupiter;
pub mod router;
pub mod token;

pub use jupiter::{AggregatorQuoter, JupiterQuoter, UpstreamReply};
pub use router::{RouterQuoter, UniswapV2Quoter};
