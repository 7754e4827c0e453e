mod common;

mod company;
mod job;
mod rollback;
