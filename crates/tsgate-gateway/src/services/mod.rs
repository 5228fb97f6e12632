//! Request-level operations over the datastore.

pub mod timeseries;

pub use timeseries::{IngestReply, ListReply, QueryData, QueryReply, TimeseriesService};
