mod client;

pub use client::SocrataClient;
