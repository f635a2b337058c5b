//! segment-tour: closed-loop route planning over fixed, directed segments.
//!
//! Given an origin and a set of segments (sub-paths that must be ridden in
//! their own direction), orders the segments into a tour that starts and
//! ends at the origin while keeping the total travel distance low. Travel
//! costs come from a [`traits::DistanceOracle`]; the ordering itself is done
//! either greedily ([`greedy`]) or exactly ([`held_karp`]).

pub mod assembler;
pub mod google;
pub mod gpx;
pub mod greedy;
pub mod haversine;
pub mod held_karp;
pub mod matrix;
pub mod osrm;
pub mod polyline;
pub mod pruner;
pub mod segment;
pub mod solver;
pub mod store;
pub mod tour;
pub mod traits;
