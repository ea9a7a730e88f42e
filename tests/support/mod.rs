#![allow(dead_code)]

pub mod corpus;
pub mod englid_env;
