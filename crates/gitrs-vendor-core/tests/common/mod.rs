#![allow(dead_code)]

pub mod fixture;
pub mod release_server;
