pub mod client;
mod dto;
pub mod handlers;

pub use client::{NominatimClient, ReverseGeocoder};
