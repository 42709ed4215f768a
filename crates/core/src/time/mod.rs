pub mod utc;
