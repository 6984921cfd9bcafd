mod availability;
mod common;
mod domain;
