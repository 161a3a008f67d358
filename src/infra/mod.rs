pub mod socrata;
