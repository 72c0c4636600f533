// src/schedule/mod.rs
//
// The slot-allocation engine: slot generation, occupancy indexing,
// availability checks and the booking write path. Everything except
// `booking` is pure and recomputed per request; occupancy is never
// persisted.

pub mod availability;
pub mod booking;
pub mod occupancy;
pub mod slots;
