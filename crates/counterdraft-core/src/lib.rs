// Counter-pick engine: counter table ingestion, hero name resolution, lane
// mapping, greedy counter suggestion and optimal-pairing win estimation.
//
// Everything in this crate is synchronous and free of I/O beyond reading
// from a caller-supplied `std::io::Read`.

pub mod dataset;
pub mod draft;
pub mod estimate;
pub mod resolver;
pub mod roles;
pub mod suggest;

mod table;
