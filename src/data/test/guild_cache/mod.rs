use super::*;

mod read;
mod write;
